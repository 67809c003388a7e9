use crate::errors::AgentError;
use crate::metrics::{MetricBatch, MetricRecord, Unit};
use async_trait::async_trait;
use aws_sdk_cloudwatch::error::DisplayErrorContext;
use aws_sdk_cloudwatch::types::{Dimension, MetricDatum, StandardUnit};
use std::io::Write;

/// PutMetricData accepts at most this many datums per call; larger
/// batches are split.
pub const MAX_RECORDS_PER_CALL: usize = 20;

/// Destination for an assembled batch.
#[async_trait]
pub trait MetricPublisher: Send + Sync {
    async fn put(&self, namespace: &str, records: &[MetricRecord]) -> Result<(), AgentError>;
}

/// Publisher backed by the CloudWatch PutMetricData API.
pub struct CloudWatchPublisher {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchPublisher {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudwatch::Client::new(config),
        }
    }
}

#[async_trait]
impl MetricPublisher for CloudWatchPublisher {
    async fn put(&self, namespace: &str, records: &[MetricRecord]) -> Result<(), AgentError> {
        let data: Vec<MetricDatum> = records.iter().map(to_datum).collect();

        self.client
            .put_metric_data()
            .namespace(namespace)
            .set_metric_data(Some(data))
            .send()
            .await
            .map_err(|e| AgentError::Publish {
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}

fn to_datum(record: &MetricRecord) -> MetricDatum {
    let dimensions: Vec<Dimension> = record
        .dimensions
        .iter()
        .map(|dim| {
            Dimension::builder()
                .name(dim.name.as_str())
                .value(dim.value.as_str())
                .build()
        })
        .collect();

    let mut datum = MetricDatum::builder()
        .metric_name(record.name)
        .unit(standard_unit(record.unit))
        .value(record.value);
    // Aggregated records go out with no dimensions member at all.
    if !dimensions.is_empty() {
        datum = datum.set_dimensions(Some(dimensions));
    }
    datum.build()
}

fn standard_unit(unit: Unit) -> StandardUnit {
    match unit {
        Unit::Percent => StandardUnit::Percent,
        Unit::Bytes => StandardUnit::Bytes,
    }
}

/// Ship the whole batch, splitting it into API-sized calls. Record order
/// is preserved and the remaining calls are abandoned on the first
/// failure; already-shipped chunks stay shipped.
pub async fn submit(
    publisher: &dyn MetricPublisher,
    namespace: &str,
    batch: &MetricBatch,
) -> Result<(), AgentError> {
    for chunk in batch.records().chunks(MAX_RECORDS_PER_CALL) {
        publisher.put(namespace, chunk).await?;
    }
    Ok(())
}

/// Write the dry-run rendering of the batch: a header line, then one line
/// per record with name, unit, value and dimension list.
pub fn render(batch: &MetricBatch, out: &mut impl Write) -> Result<(), AgentError> {
    let render_err = |e: std::io::Error| AgentError::Render { source: e };

    writeln!(out, "Dry run. metric data that would be sent:").map_err(render_err)?;
    for record in batch.records() {
        let dims: Vec<String> = record
            .dimensions
            .iter()
            .map(|d| format!("{}={}", d.name, d.value))
            .collect();
        writeln!(
            out,
            "{} {} {} [{}]",
            record.name,
            record.unit,
            record.value,
            dims.join(" ")
        )
        .map_err(render_err)?;
    }
    Ok(())
}
