pub mod disk;
pub mod memory;

use crate::errors::AgentError;
use async_trait::async_trait;

/// Host-wide memory and swap usage, sampled once per run.
#[derive(Debug, Clone, Copy)]
pub struct MemorySample {
    pub util_percent: f64,
    pub used_bytes: u64,
    pub avail_bytes: u64,
    pub swap_util_percent: f64,
    pub swap_used_bytes: u64,
}

/// Space and inode usage for one mounted filesystem.
#[derive(Debug, Clone, Copy)]
pub struct DiskSample {
    pub space_util_percent: f64,
    pub space_used_bytes: u64,
    pub space_avail_bytes: u64,
    pub inode_util_percent: f64,
}

/// Source of resource usage numbers. The pipeline runs against this trait
/// so tests can feed it fixed samples.
#[async_trait]
pub trait ResourceSampler: Send + Sync {
    async fn memory(&self) -> Result<MemorySample, AgentError>;

    async fn disk(&self, path: &str) -> Result<DiskSample, AgentError>;
}

/// Sampler backed by the local kernel: /proc/meminfo and statvfs.
pub struct HostSampler;

#[async_trait]
impl ResourceSampler for HostSampler {
    async fn memory(&self) -> Result<MemorySample, AgentError> {
        memory::sample().await
    }

    async fn disk(&self, path: &str) -> Result<DiskSample, AgentError> {
        disk::sample(path)
    }
}
