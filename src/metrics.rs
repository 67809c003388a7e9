use crate::errors::AgentError;
use crate::identity::InstanceIdentity;
use std::fmt;

/// Unit attached to a reported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percent,
    Bytes,
}

impl Unit {
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Percent => "Percent",
            Unit::Bytes => "Bytes",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One name/value tag scoping a metric to a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One reported measurement, immutable once created.
#[derive(Debug, Clone)]
pub struct MetricRecord {
    pub name: &'static str,
    pub unit: Unit,
    pub value: f64,
    pub dimensions: Vec<Dimension>,
}

/// Ordered set of records accumulated over one run.
#[derive(Debug, Default)]
pub struct MetricBatch {
    records: Vec<MetricRecord>,
}

impl MetricBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record. This is the single accumulation point, so value
    /// validation here keeps bad samples off the wire entirely.
    pub fn add(
        &mut self,
        name: &'static str,
        unit: Unit,
        value: f64,
        dimensions: Vec<Dimension>,
    ) -> Result<(), AgentError> {
        if !value.is_finite() || value < 0.0 {
            return Err(AgentError::InvalidMetricValue {
                metric: name,
                value,
            });
        }
        self.records.push(MetricRecord {
            name,
            unit,
            value,
            dimensions,
        });
        Ok(())
    }

    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Build the dimension set for one scope.
///
/// Aggregated runs carry no dimensions at all, which is what makes the
/// backend fold the series across hosts. Otherwise each available identity
/// attribute becomes a tag, plus the filesystem path when reporting a disk
/// metric. Absent attributes are skipped, never an error.
pub fn build_dimensions(
    identity: &InstanceIdentity,
    aggregated: bool,
    file_system: Option<&str>,
) -> Vec<Dimension> {
    if aggregated {
        return Vec::new();
    }

    let mut dims = Vec::new();
    if let Some(id) = &identity.instance_id {
        dims.push(Dimension::new("InstanceId", id.as_str()));
    }
    if let Some(image) = &identity.image_id {
        dims.push(Dimension::new("ImageId", image.as_str()));
    }
    if let Some(kind) = &identity.instance_type {
        dims.push(Dimension::new("InstanceType", kind.as_str()));
    }
    if let Some(fs) = file_system {
        dims.push(Dimension::new("FileSystem", fs));
    }
    dims
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_identity() -> InstanceIdentity {
        InstanceIdentity {
            region: "eu-west-1".to_string(),
            instance_id: Some("i-abc123".to_string()),
            image_id: Some("ami-deadbeef".to_string()),
            instance_type: Some("m5.large".to_string()),
        }
    }

    #[test]
    fn test_add_rejects_non_finite_values() {
        let mut batch = MetricBatch::new();
        assert!(batch
            .add("MemoryUtilization", Unit::Percent, f64::NAN, Vec::new())
            .is_err());
        assert!(batch
            .add("MemoryUsed", Unit::Bytes, f64::INFINITY, Vec::new())
            .is_err());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_add_rejects_negative_values() {
        let mut batch = MetricBatch::new();
        let err = batch
            .add("SwapUsed", Unit::Bytes, -1.0, Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            AgentError::InvalidMetricValue {
                metric: "SwapUsed",
                ..
            }
        ));
    }

    #[test]
    fn test_add_preserves_order() {
        let mut batch = MetricBatch::new();
        batch
            .add("MemoryUtilization", Unit::Percent, 50.0, Vec::new())
            .unwrap();
        batch.add("MemoryUsed", Unit::Bytes, 1024.0, Vec::new()).unwrap();
        batch.add("SwapUtil", Unit::Percent, 0.0, Vec::new()).unwrap();

        let names: Vec<&str> = batch.records().iter().map(|r| r.name).collect();
        assert_eq!(names, ["MemoryUtilization", "MemoryUsed", "SwapUtil"]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_build_dimensions_aggregated_is_empty() {
        let dims = build_dimensions(&full_identity(), true, Some("/data"));
        assert!(dims.is_empty());
    }

    #[test]
    fn test_build_dimensions_orders_all_attributes() {
        let dims = build_dimensions(&full_identity(), false, Some("/data"));
        let names: Vec<&str> = dims.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["InstanceId", "ImageId", "InstanceType", "FileSystem"]);
        assert_eq!(dims[3].value, "/data");
    }

    #[test]
    fn test_build_dimensions_skips_absent_attributes() {
        let identity = InstanceIdentity::placeholder();
        let dims = build_dimensions(&identity, false, None);
        let names: Vec<&str> = dims.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["ImageId", "InstanceType"]);
    }
}
