//! External command execution layer
//!
//! Single place where shell commands are run:
//! - Executes via `sh -c`
//! - Captures combined stdout + stderr and the real exit code
//! - Returns a structured result WITHOUT interpretation
//!
//! This layer never fails: a command that could not even be spawned comes
//! back as a `CmdOutput` with exit code -1, so callers decide what a
//! non-zero exit means for their step.

use std::process::Command;
use std::time::Instant;
use tracing::debug;

/// Maximum output length to capture (prevent memory issues)
const MAX_OUTPUT_BYTES: usize = 64 * 1024; // 64KB

/// Result of one external command invocation
#[derive(Debug, Clone)]
pub struct CmdOutput {
    /// Full command line that was executed
    pub command: String,
    /// Exit code (0 = success, -1 = could not spawn)
    pub exit_code: i32,
    /// Combined stdout + stderr (truncated if too long)
    pub output: String,
    /// Whether the output was truncated
    pub truncated: bool,
    /// Execution duration
    pub duration_ms: u64,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs external commands on the real system
#[derive(Debug, Clone, Default)]
pub struct CommandRunner;

impl CommandRunner {
    pub fn new() -> Self {
        Self
    }

    /// Execute a command line, capturing combined output and exit code
    pub fn run(&self, command: &str) -> CmdOutput {
        let start = Instant::now();

        let result = Command::new("sh").arg("-c").arg(command).output();

        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(out) => {
                // stderr is appended so the session log sees everything
                // the tools said
                let mut combined = out.stdout;
                combined.extend_from_slice(&out.stderr);
                let (output, truncated) = truncate_output(&combined);
                let exit_code = out.status.code().unwrap_or(-1);
                debug!(command, exit_code, duration_ms, "command finished");

                CmdOutput {
                    command: command.to_string(),
                    exit_code,
                    output,
                    truncated,
                    duration_ms,
                }
            }
            Err(e) => {
                debug!(command, error = %e, "command failed to spawn");

                CmdOutput {
                    command: command.to_string(),
                    exit_code: -1,
                    output: format!("failed to spawn: {}", e),
                    truncated: false,
                    duration_ms,
                }
            }
        }
    }

    /// Check whether a tool exists on the PATH
    pub fn has_command(&self, name: &str) -> bool {
        self.run(&format!("command -v {}", name)).success()
    }
}

/// Truncate output to max bytes, converting to string
fn truncate_output(bytes: &[u8]) -> (String, bool) {
    let truncated = bytes.len() > MAX_OUTPUT_BYTES;
    let slice = if truncated {
        &bytes[..MAX_OUTPUT_BYTES]
    } else {
        bytes
    };

    (String::from_utf8_lossy(slice).to_string(), truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_captures_exit_code_and_output() {
        let runner = CommandRunner::new();
        let result = runner.run("echo upkeep-ok");
        assert_eq!(result.exit_code, 0);
        assert!(result.success());
        assert!(result.output.contains("upkeep-ok"));
    }

    #[test]
    fn test_run_nonzero_exit_is_not_an_error() {
        let runner = CommandRunner::new();
        let result = runner.run("exit 3");
        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
    }

    #[test]
    fn test_run_merges_stderr() {
        let runner = CommandRunner::new();
        let result = runner.run("echo to-stderr 1>&2");
        assert!(result.output.contains("to-stderr"));
    }

    #[test]
    fn test_run_missing_binary_reports_via_output() {
        let runner = CommandRunner::new();
        let result = runner.run("definitely-not-a-real-tool-upkeep");
        assert!(!result.success());
    }

    #[test]
    fn test_has_command() {
        let runner = CommandRunner::new();
        assert!(runner.has_command("sh"));
        assert!(!runner.has_command("definitely-not-a-real-tool-upkeep"));
    }

    #[test]
    fn test_truncate_output() {
        let big = vec![b'x'; MAX_OUTPUT_BYTES + 10];
        let (s, truncated) = truncate_output(&big);
        assert!(truncated);
        assert_eq!(s.len(), MAX_OUTPUT_BYTES);

        let (s, truncated) = truncate_output(b"short");
        assert!(!truncated);
        assert_eq!(s, "short");
    }
}
