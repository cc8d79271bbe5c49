//! upkeep - unattended maintenance orchestrator

use clap::Parser;
use std::process::ExitCode;
use upkeep::cli::Cli;
use upkeep::orchestrator;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too; only real parse errors
            // are failures
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    orchestrator::run(cli)
}
