use clap::Parser;

/// Sample local memory, swap and disk usage and publish it as CloudWatch
/// metrics, one sample-and-submit cycle per invocation.
#[derive(Parser, Debug, Clone)]
#[command(name = "aws-mon-agent", version, about)]
pub struct Config {
    /// Strip instance dimensions so the backend aggregates across hosts.
    #[arg(long)]
    pub aggregated: bool,

    /// Tag each metric with the instance's Auto Scaling group.
    #[arg(long)]
    pub auto_scaling: bool,

    /// Memory utilization (percent).
    #[arg(long)]
    pub mem_util: bool,

    /// Memory used (bytes).
    #[arg(long)]
    pub mem_used: bool,

    /// Memory available (bytes).
    #[arg(long)]
    pub mem_avail: bool,

    /// Swap utilization (percent).
    #[arg(long)]
    pub swap_util: bool,

    /// Swap used (bytes).
    #[arg(long)]
    pub swap_used: bool,

    /// Disk space utilization (percent).
    #[arg(long)]
    pub disk_space_util: bool,

    /// Disk space used (bytes).
    #[arg(long)]
    pub disk_space_used: bool,

    /// Disk space available (bytes).
    #[arg(long)]
    pub disk_space_avail: bool,

    /// Disk inode utilization (percent).
    #[arg(long)]
    pub disk_inode_util: bool,

    /// CloudWatch metric namespace.
    #[arg(long, default_value = "Linux/System")]
    pub namespace: String,

    /// Comma-separated list of mounted paths to report disk metrics for.
    #[arg(long = "disk-path", value_delimiter = ',', default_value = "/")]
    pub disk_paths: Vec<String>,

    /// Do not contact AWS; print the metric payload to stdout instead.
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

impl Config {
    /// True when at least one memory or swap metric is requested.
    pub fn wants_memory(&self) -> bool {
        self.mem_util || self.mem_used || self.mem_avail || self.swap_util || self.swap_used
    }

    /// True when at least one disk metric is requested.
    pub fn wants_disk(&self) -> bool {
        self.disk_space_util
            || self.disk_space_used
            || self.disk_space_avail
            || self.disk_inode_util
    }
}
