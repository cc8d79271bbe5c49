//! Reboot gate
//!
//! Decides how the run ends: not at all, after an interactive cancellation
//! window, or after a short unattended delay. The interactive window gives
//! an operator at a terminal ten seconds to press a key and keep the host
//! up; unattended runs always reboot.

use std::io::Read;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::info;
use upkeep_common::CommandRunner;

/// How long an interactive operator has to cancel
const CANCEL_WINDOW: Duration = Duration::from_secs(10);

/// Grace period before an unattended reboot
const UNATTENDED_DELAY: Duration = Duration::from_secs(5);

/// What the gate decided to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootPlan {
    Skip,
    InteractiveWait,
    UnattendedDelay,
}

/// How the gate actually ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootOutcome {
    Skipped,
    Cancelled,
    Rebooting,
}

/// Pick the plan from configuration and session interactivity
pub fn decide(reboot_enabled: bool, interactive: bool) -> RebootPlan {
    if !reboot_enabled {
        RebootPlan::Skip
    } else if interactive {
        RebootPlan::InteractiveWait
    } else {
        RebootPlan::UnattendedDelay
    }
}

/// Carry out the plan; only returns when no reboot was issued or the
/// reboot command has been handed to the system
pub fn execute(plan: RebootPlan, runner: &CommandRunner) -> RebootOutcome {
    match plan {
        RebootPlan::Skip => {
            info!("reboot disabled, leaving system up");
            RebootOutcome::Skipped
        }
        RebootPlan::InteractiveWait => {
            info!(
                "rebooting in {}s, press any key to cancel",
                CANCEL_WINDOW.as_secs()
            );
            if keypress_within(CANCEL_WINDOW) {
                info!("reboot cancelled by keypress");
                RebootOutcome::Cancelled
            } else {
                reboot(runner)
            }
        }
        RebootPlan::UnattendedDelay => {
            info!("unattended run, rebooting in {}s", UNATTENDED_DELAY.as_secs());
            thread::sleep(UNATTENDED_DELAY);
            reboot(runner)
        }
    }
}

/// Wait up to `window` for any byte on stdin
fn keypress_within(window: Duration) -> bool {
    let (tx, rx) = mpsc::channel();

    // The reader thread is left behind on timeout; the process is about to
    // reboot anyway.
    thread::spawn(move || {
        let mut byte = [0u8; 1];
        if std::io::stdin().read(&mut byte).is_ok() {
            let _ = tx.send(());
        }
    });

    rx.recv_timeout(window).is_ok()
}

/// Flush filesystem buffers, then restart immediately
fn reboot(runner: &CommandRunner) -> RebootOutcome {
    info!("flushing filesystem buffers and rebooting");
    runner.run("sync");
    runner.run("systemctl reboot");
    RebootOutcome::Rebooting
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_disabled_skips() {
        assert_eq!(decide(false, true), RebootPlan::Skip);
        assert_eq!(decide(false, false), RebootPlan::Skip);
    }

    #[test]
    fn test_decide_interactive_waits() {
        assert_eq!(decide(true, true), RebootPlan::InteractiveWait);
    }

    #[test]
    fn test_decide_unattended_delays() {
        assert_eq!(decide(true, false), RebootPlan::UnattendedDelay);
    }

    #[test]
    fn test_execute_skip_does_not_touch_the_system() {
        let runner = CommandRunner::new();
        assert_eq!(execute(RebootPlan::Skip, &runner), RebootOutcome::Skipped);
    }
}
