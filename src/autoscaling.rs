use crate::errors::AgentError;
use async_trait::async_trait;
use aws_sdk_autoscaling::error::DisplayErrorContext;

/// Looks up the Auto Scaling group an instance belongs to.
///
/// `Ok(None)` means the instance is not in any group, which is a normal
/// outcome. Only a failed lookup is an error.
#[async_trait]
pub trait GroupResolver: Send + Sync {
    async fn resolve_group(&self, instance_id: &str) -> Result<Option<String>, AgentError>;
}

/// Resolver backed by the DescribeAutoScalingInstances API.
pub struct AutoScalingClient {
    client: aws_sdk_autoscaling::Client,
}

impl AutoScalingClient {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_autoscaling::Client::new(config),
        }
    }
}

#[async_trait]
impl GroupResolver for AutoScalingClient {
    async fn resolve_group(&self, instance_id: &str) -> Result<Option<String>, AgentError> {
        let response = self
            .client
            .describe_auto_scaling_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| AgentError::AutoScaling {
                instance_id: instance_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(response
            .auto_scaling_instances()
            .first()
            .and_then(|instance| instance.auto_scaling_group_name())
            .map(str::to_string))
    }
}
