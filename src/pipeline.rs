use crate::autoscaling::{AutoScalingClient, GroupResolver};
use crate::collectors::{HostSampler, ResourceSampler};
use crate::config::Config;
use crate::errors::AgentError;
use crate::identity::{ImdsResolver, InstanceIdentity};
use crate::metrics::{build_dimensions, Dimension, MetricBatch, Unit};
use crate::publish::{self, CloudWatchPublisher};
use aws_config::{BehaviorVersion, Region};
use tracing::{debug, info};

/// Build the dimension set for one scope, appending the Auto Scaling
/// group when requested and resolvable.
async fn scope_dimensions(
    config: &Config,
    identity: &InstanceIdentity,
    groups: Option<&dyn GroupResolver>,
    file_system: Option<&str>,
) -> Result<Vec<Dimension>, AgentError> {
    let mut dims = build_dimensions(identity, config.aggregated, file_system);

    // Aggregated records stay dimensionless, so the group is not even
    // looked up.
    if config.aggregated || !config.auto_scaling {
        return Ok(dims);
    }

    if let (Some(groups), Some(instance_id)) = (groups, identity.instance_id.as_deref()) {
        if let Some(group) = groups.resolve_group(instance_id).await? {
            dims.push(Dimension::new("AutoScalingGroupName", group));
        }
    }
    Ok(dims)
}

/// Assemble the full ordered batch for one run.
///
/// Memory and swap metrics are sampled and added once. Disk metrics are
/// sampled and added once per configured path, each path with its own
/// dimension scope. Records are appended in flag declaration order, so
/// identical configuration always yields an identical batch. A sampler is
/// only consulted when at least one of its metrics is enabled.
pub async fn assemble_batch(
    config: &Config,
    identity: &InstanceIdentity,
    sampler: &dyn ResourceSampler,
    groups: Option<&dyn GroupResolver>,
) -> Result<MetricBatch, AgentError> {
    let mut batch = MetricBatch::new();

    if config.wants_memory() {
        let memory = sampler.memory().await?;
        debug!(
            util = memory.util_percent,
            used = memory.used_bytes,
            avail = memory.avail_bytes,
            "sampled memory"
        );
        let dims = scope_dimensions(config, identity, groups, None).await?;

        if config.mem_util {
            batch.add(
                "MemoryUtilization",
                Unit::Percent,
                memory.util_percent,
                dims.clone(),
            )?;
        }
        if config.mem_used {
            batch.add("MemoryUsed", Unit::Bytes, memory.used_bytes as f64, dims.clone())?;
        }
        if config.mem_avail {
            batch.add(
                "MemoryAvail",
                Unit::Bytes,
                memory.avail_bytes as f64,
                dims.clone(),
            )?;
        }
        if config.swap_util {
            batch.add(
                "SwapUtil",
                Unit::Percent,
                memory.swap_util_percent,
                dims.clone(),
            )?;
        }
        if config.swap_used {
            batch.add("SwapUsed", Unit::Bytes, memory.swap_used_bytes as f64, dims)?;
        }
    }

    if config.wants_disk() {
        for path in &config.disk_paths {
            let disk = sampler.disk(path).await?;
            debug!(path = %path, util = disk.space_util_percent, "sampled disk");
            let dims = scope_dimensions(config, identity, groups, Some(path)).await?;

            if config.disk_space_util {
                batch.add(
                    "DiskUtilization",
                    Unit::Percent,
                    disk.space_util_percent,
                    dims.clone(),
                )?;
            }
            if config.disk_space_used {
                batch.add(
                    "DiskUsed",
                    Unit::Bytes,
                    disk.space_used_bytes as f64,
                    dims.clone(),
                )?;
            }
            if config.disk_space_avail {
                batch.add(
                    "DiskAvail",
                    Unit::Bytes,
                    disk.space_avail_bytes as f64,
                    dims.clone(),
                )?;
            }
            if config.disk_inode_util {
                batch.add(
                    "DiskInodesUtilization",
                    Unit::Percent,
                    disk.inode_util_percent,
                    dims,
                )?;
            }
        }
    }

    Ok(batch)
}

/// Execute one sample-and-submit cycle.
pub async fn run(config: &Config) -> Result<(), AgentError> {
    if config.dry_run {
        // Dry runs never touch the network: placeholder identity, no
        // group lookup, rendered batch on stdout.
        let identity = InstanceIdentity::placeholder();
        let batch = assemble_batch(config, &identity, &HostSampler, None).await?;
        return publish::render(&batch, &mut std::io::stdout());
    }

    let identity = ImdsResolver::new()?.resolve().await?;
    info!(
        region = %identity.region,
        instance_id = identity.instance_id.as_deref().unwrap_or("unknown"),
        "resolved instance identity"
    );

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(identity.region.clone()))
        .load()
        .await;

    let asg_client;
    let groups: Option<&dyn GroupResolver> = if config.auto_scaling {
        asg_client = AutoScalingClient::new(&sdk_config);
        Some(&asg_client)
    } else {
        None
    };

    let batch = assemble_batch(config, &identity, &HostSampler, groups).await?;
    if batch.is_empty() {
        info!("no metrics selected, nothing to publish");
        return Ok(());
    }

    let publisher = CloudWatchPublisher::new(&sdk_config);
    publish::submit(&publisher, &config.namespace, &batch).await?;
    info!(
        records = batch.len(),
        namespace = %config.namespace,
        "published metric batch"
    );
    Ok(())
}

// ─────────────────────────────────────────────
// Unit tests over stub samplers and resolvers
// ─────────────────────────────────────────────
