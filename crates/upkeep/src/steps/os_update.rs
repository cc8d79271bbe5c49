//! OS package update step
//!
//! Refreshes the package metadata and runs a full upgrade. A failed
//! metadata refresh means the upgrade is not even attempted. The dry-run
//! summary line feeding the report detail is best-effort: apt output
//! formats drift between releases, so the count is informative, never
//! authoritative.

use crate::pipeline::StepOutcome;
use regex::Regex;
use tracing::warn;
use upkeep_common::CommandRunner;

pub const NAME: &str = "OS Update";

pub fn run(runner: &CommandRunner) -> (StepOutcome, String) {
    let refresh = runner.run("apt-get update");
    if !refresh.success() {
        warn!("package metadata refresh failed (exit {})", refresh.exit_code);
        return (StepOutcome::Failed, "Update".to_string());
    }

    // Dry run first, only to harvest a human-readable summary
    let dry_run = runner.run("apt-get -s dist-upgrade");
    let summary = upgrade_summary(&dry_run.output);

    let upgrade = runner.run("DEBIAN_FRONTEND=noninteractive apt-get -y dist-upgrade");
    if upgrade.success() {
        let detail = summary.unwrap_or_else(|| "Upgrade complete".to_string());
        (StepOutcome::Success, detail)
    } else {
        warn!("upgrade failed (exit {})", upgrade.exit_code);
        (StepOutcome::Failed, "Upgrade".to_string())
    }
}

/// Pull the "<N> upgraded, <M> newly installed..." line out of apt output
pub(crate) fn upgrade_summary(output: &str) -> Option<String> {
    let re = Regex::new(r"(?m)^(\d+) upgraded, (\d+) newly installed.*$").ok()?;
    re.find(output).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_summary_found() {
        let output = "Reading package lists...\n\
                      12 upgraded, 3 newly installed, 0 to remove and 0 not upgraded.\n";
        assert_eq!(
            upgrade_summary(output).as_deref(),
            Some("12 upgraded, 3 newly installed, 0 to remove and 0 not upgraded.")
        );
    }

    #[test]
    fn test_upgrade_summary_absent() {
        assert_eq!(upgrade_summary("nothing useful here"), None);
    }

    #[test]
    fn test_upgrade_summary_ignores_mid_line_matches() {
        // The count line must start the line, not be quoted inside another
        assert_eq!(upgrade_summary("note: 3 upgraded, 1 newly installed"), None);
    }
}
