//! Pi-hole update step
//!
//! Takes a timestamped settings backup, prunes old backups to the retention
//! count, then runs the core update followed by a gravity refresh. The two
//! update phases fold into one composite status; a failed backup is noted
//! in the detail but never blocks the update attempt.

use crate::pipeline::StepOutcome;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use upkeep_common::{CommandRunner, Config};

pub const NAME: &str = "Pi-hole Update";

pub fn run(runner: &CommandRunner, cfg: &Config) -> (StepOutcome, String) {
    if !runner.has_command("pihole") {
        return (StepOutcome::NotInstalled, "pihole command not found".to_string());
    }

    let backup_note = match backup_settings(runner, cfg) {
        Ok(path) => {
            if let Err(e) = prune_backups(&cfg.backup_dir, cfg.backup_retention) {
                warn!("backup pruning failed: {:#}", e);
            }
            format!("backup {}", path.display())
        }
        Err(e) => {
            warn!("settings backup failed: {:#}", e);
            "backup failed".to_string()
        }
    };

    let core = runner.run("pihole -up");
    if !core.success() {
        warn!("pihole core update failed (exit {})", core.exit_code);
        return (StepOutcome::Failed, format!("Core failed; {}", backup_note));
    }

    let gravity = runner.run("pihole -g");
    if gravity.success() {
        (
            StepOutcome::Success,
            format!("Core & Gravity; {}", backup_note),
        )
    } else {
        warn!("gravity refresh failed (exit {})", gravity.exit_code);
        (
            StepOutcome::PartialSuccess,
            format!("Core ok, Gravity failed; {}", backup_note),
        )
    }
}

/// Archive /etc/pihole into the backup directory under a timestamped name
fn backup_settings(runner: &CommandRunner, cfg: &Config) -> Result<PathBuf> {
    fs::create_dir_all(&cfg.backup_dir)
        .with_context(|| format!("creating backup dir {}", cfg.backup_dir.display()))?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let archive = cfg.backup_dir.join(format!("pihole-{}.tar.gz", timestamp));

    let tar = runner.run(&format!("tar czf {} -C /etc pihole", archive.display()));
    if !tar.success() {
        bail!("tar exited with {}", tar.exit_code);
    }

    Ok(archive)
}

/// Keep only the `retain` newest backup artifacts, returning how many went
pub(crate) fn prune_backups(dir: &Path, retain: usize) -> Result<usize> {
    let mut backups: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            let modified = entry.metadata()?.modified()?;
            backups.push((modified, entry.path()));
        }
    }

    // Newest first
    backups.sort_by(|a, b| b.0.cmp(&a.0));

    let mut removed = 0;
    for (_, path) in backups.into_iter().skip(retain) {
        fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
        removed += 1;
    }

    Ok(removed)
}
