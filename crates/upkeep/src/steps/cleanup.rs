//! Disk space reclamation step
//!
//! Package autoremoval, cache cleaning and journal vacuuming. Any
//! constituent failing makes the whole step a failure; the removed-package
//! count is parsed out of apt output as a best-effort detail.

use crate::pipeline::StepOutcome;
use tracing::warn;
use upkeep_common::CommandRunner;

pub const NAME: &str = "Cleanup";

pub fn run(runner: &CommandRunner) -> (StepOutcome, String) {
    let autoremove = runner.run("DEBIAN_FRONTEND=noninteractive apt-get -y autoremove --purge");
    let autoclean = runner.run("apt-get -y autoclean");
    let vacuum = runner.run("journalctl --vacuum-time=7d");

    let mut failures = Vec::new();
    for (name, result) in [
        ("autoremove", &autoremove),
        ("autoclean", &autoclean),
        ("journal vacuum", &vacuum),
    ] {
        if !result.success() {
            warn!("cleanup: {} failed (exit {})", name, result.exit_code);
            failures.push(name);
        }
    }

    if failures.is_empty() {
        let removed = count_removed(&autoremove.output);
        (
            StepOutcome::Success,
            format!("{} packages removed", removed),
        )
    } else {
        (StepOutcome::Failed, failures.join(", "))
    }
}

/// Count "Removing <pkg>..." lines in apt output
pub(crate) fn count_removed(output: &str) -> usize {
    output
        .lines()
        .filter(|line| line.trim_start().starts_with("Removing "))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_removed() {
        let output = "Reading package lists...\n\
                      Removing old-kernel (1.2.3) ...\n\
                      Removing stale-lib (4.5) ...\n\
                      Processing triggers ...\n";
        assert_eq!(count_removed(output), 2);
    }

    #[test]
    fn test_count_removed_none() {
        assert_eq!(count_removed("0 upgraded, 0 newly installed.\n"), 0);
    }
}
