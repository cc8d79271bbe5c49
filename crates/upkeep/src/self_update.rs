//! Self-update agent
//!
//! Runs before the lock is taken, so a stale older instance can never hold
//! back a newer one. A newer candidate atomically replaces the on-disk
//! binary and the process re-executes itself with identical arguments; the
//! fresh process then sees equal versions and stops recursing. Every
//! failure here is non-fatal: the run simply continues on the old build.

use std::env;
use std::fs;
use std::os::unix::process::CommandExt;
use std::process::Command;
use thiserror::Error;
use tracing::{info, warn};
use upkeep_common::version::{extract_tag, is_newer, LOCAL_VERSION};
use upkeep_common::Config;

#[derive(Debug, Error)]
pub enum SelfUpdateError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("empty download")]
    EmptyDownload,

    #[error("candidate declares no version tag")]
    NoVersionTag,

    #[error("install failed: {0}")]
    Install(String),
}

/// What the self-update check concluded
#[derive(Debug)]
pub enum SelfUpdate {
    /// Update source not configured
    Skipped,
    /// Candidate is not newer than the running build
    UpToDate,
    /// Failure, run continues on the current build
    Failed(SelfUpdateError),
}

/// Check the update source and re-exec under a newer build if one exists
///
/// On a successful update this never returns: the process image has been
/// replaced.
pub fn check_and_apply(cfg: &Config) -> SelfUpdate {
    if !cfg.update_configured() {
        info!("self-update source not configured, skipping");
        return SelfUpdate::Skipped;
    }

    let candidate = match download(&cfg.update_url) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("self-update download failed: {}", e);
            return SelfUpdate::Failed(e);
        }
    };

    // The local side of the comparison is always the tag embedded in this
    // binary. Anything else (a config value, say) would survive the binary
    // swap and make the freshly re-exec'd build apply the same candidate
    // again, forever.
    let remote = match evaluate_candidate(&candidate, LOCAL_VERSION) {
        Ok(Some(remote)) => remote,
        Ok(None) => {
            info!("already on the newest build (tag {})", LOCAL_VERSION);
            return SelfUpdate::UpToDate;
        }
        Err(e) => {
            warn!("self-update rejected candidate: {}", e);
            return SelfUpdate::Failed(e);
        }
    };

    info!(
        "self-update: applying tag {} over local {}",
        remote, LOCAL_VERSION
    );

    // install_and_restart only returns on error
    let e = match install_and_restart(&candidate) {
        Err(e) => e,
        Ok(never) => match never {},
    };
    warn!("self-update install failed: {}", e);
    SelfUpdate::Failed(e)
}

/// Decide whether a candidate should apply
///
/// `Ok(Some(tag))` means apply, `Ok(None)` means the candidate is not
/// newer. A candidate without a tag is always rejected.
pub(crate) fn evaluate_candidate(
    candidate: &[u8],
    local: u64,
) -> Result<Option<u64>, SelfUpdateError> {
    if candidate.is_empty() {
        return Err(SelfUpdateError::EmptyDownload);
    }

    let remote = extract_tag(candidate).ok_or(SelfUpdateError::NoVersionTag)?;

    if is_newer(remote, local) {
        Ok(Some(remote))
    } else {
        Ok(None)
    }
}

fn download(url: &str) -> Result<Vec<u8>, SelfUpdateError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| SelfUpdateError::Connection(e.to_string()))?;

    let bytes = response
        .bytes()
        .map_err(|e| SelfUpdateError::Connection(e.to_string()))?;

    Ok(bytes.to_vec())
}

/// Atomically replace our own binary and re-exec with the same arguments
fn install_and_restart(candidate: &[u8]) -> Result<std::convert::Infallible, SelfUpdateError> {
    let install = |candidate: &[u8]| -> anyhow::Result<std::path::PathBuf> {
        let exe = env::current_exe()?;
        let staged = exe.with_extension("new");

        // Preserve the running binary's permission bits on the candidate
        let perms = fs::metadata(&exe)?.permissions();
        fs::write(&staged, candidate)?;
        fs::set_permissions(&staged, perms)?;
        fs::rename(&staged, &exe)?;
        Ok(exe)
    };

    let exe = install(candidate).map_err(|e| SelfUpdateError::Install(format!("{:#}", e)))?;

    info!("restarting under the new build");
    let err = Command::new(&exe).args(env::args_os().skip(1)).exec();

    // exec only returns on failure
    Err(SelfUpdateError::Install(format!(
        "exec of {} failed: {}",
        exe.display(),
        err
    )))
}
