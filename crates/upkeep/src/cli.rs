//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::Parser;

/// Unattended maintenance orchestrator
#[derive(Debug, Parser)]
#[command(name = "upkeep")]
#[command(about = "Unattended maintenance for a headless appliance host", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Check for a newer build, apply it, and exit without maintenance
    #[arg(long)]
    pub update_only: bool,

    /// Leave the system running when the pipeline finishes
    #[arg(long)]
    pub no_reboot: bool,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["upkeep"]);
        assert!(!cli.update_only);
        assert!(!cli.no_reboot);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["upkeep", "--update-only", "--no-reboot", "-v"]);
        assert!(cli.update_only);
        assert!(cli.no_reboot);
        assert!(cli.verbose);
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["upkeep", "--frobnicate"]).is_err());
    }
}
