use super::MemorySample;
use crate::errors::AgentError;
use std::collections::HashMap;
use tokio::fs;

const MEMINFO_PATH: &str = "/proc/meminfo";

/// Read /proc/meminfo and compute the memory and swap sample.
pub async fn sample() -> Result<MemorySample, AgentError> {
    let content = fs::read_to_string(MEMINFO_PATH)
        .await
        .map_err(|e| AgentError::ProcRead {
            path: MEMINFO_PATH.into(),
            source: e,
        })?;

    compute(&parse_meminfo(&content))
}

/// Parse /proc/meminfo into a key-value map of kB values.
fn parse_meminfo(content: &str) -> HashMap<String, u64> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() >= 2 {
            let key = parts[0].trim_end_matches(':').to_string();
            if let Ok(val) = parts[1].parse::<u64>() {
                map.insert(key, val);
            }
        }
    }
    map
}

/// Extract a required field from meminfo, converting kB -> bytes.
fn get_bytes(map: &HashMap<String, u64>, field: &str) -> Result<u64, AgentError> {
    map.get(field)
        .map(|kb| kb * 1024)
        .ok_or_else(|| AgentError::ProcParse {
            path: MEMINFO_PATH.into(),
            field: field.into(),
            raw: "field not found".into(),
        })
}

/// Derive the reported values from the raw meminfo map.
///
/// Available memory is counted as free + buffers + cached rather than the
/// kernel's MemAvailable estimate, so the reported series stays comparable
/// across kernels that predate that field.
fn compute(map: &HashMap<String, u64>) -> Result<MemorySample, AgentError> {
    let total = get_bytes(map, "MemTotal")?;
    let free = get_bytes(map, "MemFree")?;
    let buffers = get_bytes(map, "Buffers").unwrap_or(0);
    let cached = get_bytes(map, "Cached").unwrap_or(0);
    // Swapless hosts report zeros, not an error.
    let swap_total = get_bytes(map, "SwapTotal").unwrap_or(0);
    let swap_free = get_bytes(map, "SwapFree").unwrap_or(0);

    let avail = free + buffers + cached;
    let used = total.saturating_sub(avail);
    let swap_used = swap_total.saturating_sub(swap_free);

    let util_percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let swap_util_percent = if swap_total > 0 {
        swap_used as f64 / swap_total as f64 * 100.0
    } else {
        0.0
    };

    Ok(MemorySample {
        util_percent,
        used_bytes: used,
        avail_bytes: avail,
        swap_util_percent,
        swap_used_bytes: swap_used,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MEMINFO: &str = "\
MemTotal:       16384000 kB
MemFree:         2048000 kB
MemAvailable:    4096000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapTotal:       8192000 kB
SwapFree:        4096000 kB";

    #[test]
    fn test_parse_meminfo() {
        let map = parse_meminfo(SAMPLE_MEMINFO);
        assert_eq!(map["MemTotal"], 16384000);
        assert_eq!(map["MemFree"], 2048000);
        assert_eq!(map["SwapTotal"], 8192000);
        assert_eq!(map["SwapFree"], 4096000);
    }

    #[test]
    fn test_get_bytes_converts_kb_to_bytes() {
        let mut map = HashMap::new();
        map.insert("MemTotal".to_string(), 1024);
        let bytes = get_bytes(&map, "MemTotal").unwrap();
        assert_eq!(bytes, 1024 * 1024);
    }

    #[test]
    fn test_get_bytes_missing_field() {
        let map = HashMap::new();
        let err = get_bytes(&map, "NonExistent").unwrap_err();
        assert!(matches!(
            err,
            AgentError::ProcParse { ref field, .. } if field == "NonExistent"
        ));
    }

    #[test]
    fn test_compute_sample() {
        let sample = compute(&parse_meminfo(SAMPLE_MEMINFO)).unwrap();
        // avail = free + buffers + cached = 4608000 kB
        assert_eq!(sample.avail_bytes, 4_608_000 * 1024);
        assert_eq!(sample.used_bytes, (16_384_000 - 4_608_000) * 1024);
        assert!((sample.util_percent - 71.875).abs() < 1e-9);
        assert_eq!(sample.swap_used_bytes, 4_096_000 * 1024);
        assert!((sample.swap_util_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_without_swap() {
        let content = "\
MemTotal:       1024000 kB
MemFree:         256000 kB
Buffers:          64000 kB
Cached:          192000 kB";
        let sample = compute(&parse_meminfo(content)).unwrap();
        assert_eq!(sample.swap_used_bytes, 0);
        assert_eq!(sample.swap_util_percent, 0.0);
        assert_eq!(sample.avail_bytes, 512_000 * 1024);
    }

    #[test]
    fn test_compute_requires_mem_total() {
        let content = "MemFree:         256000 kB";
        assert!(compute(&parse_meminfo(content)).is_err());
    }
}
