//! Resolver root-hints refresh step
//!
//! Downloads fresh root hints next to the current file and only swaps them
//! in when the content actually changed, so running twice against an
//! unchanged remote is a no-op. The resolver restart is reported separately
//! from the content update itself.

use crate::pipeline::StepOutcome;
use std::fs;
use std::path::Path;
use tracing::warn;
use upkeep_common::{CommandRunner, Config};

pub const NAME: &str = "Root Hints";

const HINTS_FILE: &str = "root.hints";

pub fn run(runner: &CommandRunner, cfg: &Config) -> (StepOutcome, String) {
    if !cfg.root_hints_dir.is_dir() {
        return (
            StepOutcome::NotInstalled,
            format!("{} not present", cfg.root_hints_dir.display()),
        );
    }

    let candidate = match fetch_hints(&cfg.root_hints_url) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("root hints download failed: {:#}", e);
            return (StepOutcome::Failed, "Download failed".to_string());
        }
    };

    apply_hints(&cfg.root_hints_dir, &candidate, || {
        runner.run("systemctl restart unbound").success()
    })
}

/// Swap in new hints if they differ, then restart the resolver
///
/// The restart closure keeps this decision logic independent of how the
/// service is actually bounced.
pub(crate) fn apply_hints<F>(dir: &Path, candidate: &[u8], restart: F) -> (StepOutcome, String)
where
    F: FnOnce() -> bool,
{
    if candidate.is_empty() {
        return (StepOutcome::Failed, "Empty download".to_string());
    }

    let target = dir.join(HINTS_FILE);
    if let Ok(current) = fs::read(&target) {
        if current == candidate {
            return (StepOutcome::Success, "Up to date".to_string());
        }
    }

    // Side-by-side temp file, then atomic rename
    let staged = dir.join(format!("{}.tmp", HINTS_FILE));
    if let Err(e) = fs::write(&staged, candidate).and_then(|_| fs::rename(&staged, &target)) {
        warn!("installing root hints failed: {}", e);
        let _ = fs::remove_file(&staged);
        return (StepOutcome::Failed, "Install failed".to_string());
    }

    if restart() {
        (StepOutcome::Success, "Updated & restarted".to_string())
    } else {
        (
            StepOutcome::PartialSuccess,
            "Updated, restart failed".to_string(),
        )
    }
}

fn fetch_hints(url: &str) -> anyhow::Result<Vec<u8>> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    Ok(response.bytes()?.to_vec())
}
