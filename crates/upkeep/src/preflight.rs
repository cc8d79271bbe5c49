//! Fatal precondition checks
//!
//! Run once, before the lock is taken and before anything mutates. A
//! failure here aborts the whole run with exit code 1: no lock file, no
//! report, no side effects.

use thiserror::Error;
use tracing::{info, warn};
use upkeep_common::{CommandRunner, Config};

/// External tools the run cannot proceed without
const REQUIRED_TOOLS: &[&str] = &["apt-get", "mail"];

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("must run as root")]
    NotRoot,

    #[error("required tool '{0}' not found")]
    MissingDependency(String),

    #[error("no network reachability (cannot reach {0})")]
    NoConnectivity(String),

    #[error("insufficient disk space: {free_mb} MB free, {required_mb} MB required")]
    LowDiskSpace { free_mb: u64, required_mb: u64 },
}

/// Verify privilege, dependencies, connectivity and disk space
pub fn check(runner: &CommandRunner, cfg: &Config) -> Result<(), PreflightError> {
    if unsafe { libc::geteuid() } != 0 {
        return Err(PreflightError::NotRoot);
    }

    for tool in REQUIRED_TOOLS {
        if !runner.has_command(tool) {
            return Err(PreflightError::MissingDependency(tool.to_string()));
        }
    }

    let ping = runner.run(&format!("ping -c 1 -W 2 {}", cfg.connectivity_host));
    if !ping.success() {
        return Err(PreflightError::NoConnectivity(cfg.connectivity_host.clone()));
    }

    check_disk(root_free_disk_mb(), cfg.min_free_disk_mb)
}

/// Enforce the free-space threshold; an unreadable disk list is loudly
/// skipped rather than silently passed
fn check_disk(free_mb: Option<u64>, required_mb: u64) -> Result<(), PreflightError> {
    match free_mb {
        Some(free_mb) if free_mb < required_mb => Err(PreflightError::LowDiskSpace {
            free_mb,
            required_mb,
        }),
        Some(free_mb) => {
            info!("preflight ok ({} MB free on /)", free_mb);
            Ok(())
        }
        None => {
            warn!("could not determine free space on /, disk check skipped");
            Ok(())
        }
    }
}

/// Free space on the root filesystem in MB, if it can be determined
fn root_free_disk_mb() -> Option<u64> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    disks
        .iter()
        .find(|d| d.mount_point() == std::path::Path::new("/"))
        .map(|d| d.available_space() / (1024 * 1024))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_free_disk_mb_does_not_panic() {
        // Containers may expose no disk list at all; None is acceptable
        let _ = root_free_disk_mb();
    }

    #[test]
    fn test_check_disk_below_threshold_is_fatal() {
        assert!(matches!(
            check_disk(Some(100), 512),
            Err(PreflightError::LowDiskSpace {
                free_mb: 100,
                required_mb: 512,
            })
        ));
    }

    #[test]
    fn test_check_disk_above_threshold_passes() {
        assert!(check_disk(Some(2048), 512).is_ok());
    }

    #[test]
    fn test_check_disk_unknown_free_space_is_skipped_not_fatal() {
        assert!(check_disk(None, 512).is_ok());
    }

    #[test]
    fn test_low_disk_error_carries_both_sides() {
        let err = PreflightError::LowDiskSpace {
            free_mb: 100,
            required_mb: 512,
        };
        let msg = err.to_string();
        assert!(msg.contains("100 MB free"));
        assert!(msg.contains("512 MB required"));
    }
}
