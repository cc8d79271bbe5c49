//! Monitoring tool update step
//!
//! RPi-Monitor ships its updater under different names across versions, so
//! the step prefers the packaged command and falls back to the known script
//! path. An installed monitor with no reachable updater is a warning, not a
//! failure.

use crate::pipeline::StepOutcome;
use std::path::Path;
use tracing::warn;
use upkeep_common::CommandRunner;

pub const NAME: &str = "Monitor Update";

const UPDATE_COMMAND: &str = "rpimonitor-update";
const UPDATE_SCRIPT: &str = "/usr/share/rpimonitor/scripts/updatePackagesStatus.pl";

pub fn run(runner: &CommandRunner) -> (StepOutcome, String) {
    let installed = runner.run("dpkg -s rpimonitor").success();
    let has_update_cmd = runner.has_command(UPDATE_COMMAND);
    outcome(runner, installed, has_update_cmd, Path::new(UPDATE_SCRIPT))
}

/// Map the probed state to the step outcome, running the updater if one
/// was found
pub(crate) fn outcome(
    runner: &CommandRunner,
    installed: bool,
    has_update_cmd: bool,
    script: &Path,
) -> (StepOutcome, String) {
    if !installed {
        return (StepOutcome::NotInstalled, "package not present".to_string());
    }

    let command = match update_command(has_update_cmd, script) {
        Some(command) => command,
        None => {
            return (
                StepOutcome::PartialSuccess,
                "Installed (update cmd missing)".to_string(),
            );
        }
    };

    let update = runner.run(&command);
    if update.success() {
        (StepOutcome::Success, String::new())
    } else {
        warn!("monitor update failed (exit {})", update.exit_code);
        (StepOutcome::Failed, format!("exit {}", update.exit_code))
    }
}

/// Prefer the packaged command, fall back to the script path
pub(crate) fn update_command(has_update_cmd: bool, script: &Path) -> Option<String> {
    if has_update_cmd {
        Some(UPDATE_COMMAND.to_string())
    } else if script.is_file() {
        Some(format!("perl {}", script.display()))
    } else {
        None
    }
}
