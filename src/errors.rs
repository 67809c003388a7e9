use thiserror::Error;

// One variant per pipeline stage so tests can match on the failing stage.

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("failed to read {path}: {source}")]
    ProcRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {field} from {path}: {raw}")]
    ProcParse {
        path: String,
        field: String,
        raw: String,
    },

    #[error("failed to stat filesystem {path}: {source}")]
    Statvfs { path: String, source: nix::Error },

    #[error("can't reach the instance metadata service, please confirm this is an EC2 instance: {source}")]
    Imds { source: reqwest::Error },

    #[error("malformed instance identity document: {source}")]
    IdentityDocument { source: serde_json::Error },

    #[error("can't resolve auto scaling group for {instance_id}: {message}")]
    AutoScaling {
        instance_id: String,
        message: String,
    },

    #[error("refusing to report {metric}: invalid value {value}")]
    InvalidMetricValue { metric: &'static str, value: f64 },

    #[error("can't put metric data: {message}")]
    Publish { message: String },

    #[error("failed to write dry run output: {source}")]
    Render { source: std::io::Error },
}
