use super::DiskSample;
use crate::errors::AgentError;
use nix::sys::statvfs::statvfs;
use std::path::Path;

/// Query statvfs(3) for a mounted path and compute the disk sample.
pub fn sample(path: &str) -> Result<DiskSample, AgentError> {
    let stat = statvfs(Path::new(path)).map_err(|e| AgentError::Statvfs {
        path: path.into(),
        source: e,
    })?;

    Ok(compute(
        stat.fragment_size() as u64,
        stat.blocks() as u64,
        stat.blocks_free() as u64,
        stat.blocks_available() as u64,
        stat.files() as u64,
        stat.files_free() as u64,
    ))
}

/// Derive the reported values from raw statvfs counts.
///
/// Used space counts blocks unavailable to anyone (total - free), while
/// available space counts blocks usable by unprivileged processes, so the
/// two need not sum to the total on filesystems with a reserved share.
fn compute(frsize: u64, blocks: u64, bfree: u64, bavail: u64, files: u64, ffree: u64) -> DiskSample {
    let total = frsize * blocks;
    let used = frsize * blocks.saturating_sub(bfree);
    let avail = frsize * bavail;

    let space_util_percent = if total > 0 {
        used as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let inodes_used = files.saturating_sub(ffree);
    let inode_util_percent = if files > 0 {
        inodes_used as f64 / files as f64 * 100.0
    } else {
        0.0
    };

    DiskSample {
        space_util_percent,
        space_used_bytes: used,
        space_avail_bytes: avail,
        inode_util_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_space_math() {
        let sample = compute(4096, 1000, 400, 350, 100, 60);
        assert_eq!(sample.space_used_bytes, 4096 * 600);
        assert_eq!(sample.space_avail_bytes, 4096 * 350);
        assert!((sample.space_util_percent - 60.0).abs() < 1e-9);
        assert!((sample.inode_util_percent - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_empty_filesystem() {
        let sample = compute(4096, 0, 0, 0, 0, 0);
        assert_eq!(sample.space_used_bytes, 0);
        assert_eq!(sample.space_avail_bytes, 0);
        assert_eq!(sample.space_util_percent, 0.0);
        assert_eq!(sample.inode_util_percent, 0.0);
    }

    #[test]
    fn test_sample_real_mount() {
        let dir = tempfile::tempdir().unwrap();
        let sample = sample(dir.path().to_str().unwrap()).unwrap();
        assert!(sample.space_util_percent >= 0.0 && sample.space_util_percent <= 100.0);
        assert!(sample.inode_util_percent >= 0.0 && sample.inode_util_percent <= 100.0);
    }

    #[test]
    fn test_sample_missing_path() {
        let err = sample("/no/such/mount/point").unwrap_err();
        assert!(matches!(
            err,
            AgentError::Statvfs { ref path, .. } if path == "/no/such/mount/point"
        ));
    }
}
