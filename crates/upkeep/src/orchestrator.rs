//! Run orchestration
//!
//! Wires the components together in their one valid order: self-update,
//! pre-flight, lock, pipeline, health, report, mail, reboot gate. Exit
//! code 1 is reserved for fatal preconditions; everything past the lock is
//! best-effort completion with honest reporting.

use crate::cli::Cli;
use crate::pipeline::{Pipeline, StepResult};
use crate::{health, logging, notifier, preflight, reboot, report, self_update, steps};
use std::fs;
use std::process::ExitCode;
use tracing::{error, info, warn};
use upkeep_common::{CommandRunner, Config, RunLock, SessionLog};

/// Execute one full maintenance run
pub fn run(cli: Cli) -> ExitCode {
    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("upkeep: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Session log must exist before the first tracing event
    let session = match SessionLog::open(&cfg.log_path) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("upkeep: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(session.tee_writer(), cli.verbose);

    info!(
        "upkeep starting (version tag {}, pid {})",
        upkeep_common::version::LOCAL_VERSION,
        std::process::id()
    );

    // Before locking, so an old instance never blocks a newer one. On a
    // successful update this call does not return.
    match self_update::check_and_apply(&cfg) {
        self_update::SelfUpdate::Skipped | self_update::SelfUpdate::UpToDate => {}
        self_update::SelfUpdate::Failed(e) => {
            warn!("continuing on current build: {}", e);
        }
    }

    if cli.update_only {
        info!("update-only mode, exiting");
        return ExitCode::SUCCESS;
    }

    let runner = CommandRunner::new();

    if let Err(e) = preflight::check(&runner, &cfg) {
        error!("precondition failed: {}", e);
        return ExitCode::FAILURE;
    }

    let _lock = match RunLock::acquire(&cfg.lock_path) {
        Ok(lock) => lock,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let results = run_pipeline(&runner, &cfg);
    let health = health::check(&runner, &cfg.expected_services);

    let summary = report::render(&results, &health);
    info!("\n{}", summary);

    deliver_report(&session, &results, &cfg);

    let reboot_enabled = cfg.reboot_enabled && !cli.no_reboot;
    let plan = reboot::decide(reboot_enabled, atty::is(atty::Stream::Stdin));
    reboot::execute(plan, &runner);

    // Normal completion and a cancelled reboot both exit clean
    ExitCode::SUCCESS
}

/// Assemble and run the canonical step sequence
fn run_pipeline(runner: &CommandRunner, cfg: &Config) -> Vec<StepResult> {
    let mut pipeline = Pipeline::new();

    pipeline.add(steps::os_update::NAME, || steps::os_update::run(runner));
    pipeline.add(steps::pihole::NAME, || steps::pihole::run(runner, cfg));
    pipeline.add(steps::root_hints::NAME, || {
        steps::root_hints::run(runner, cfg)
    });
    pipeline.add(steps::monitor::NAME, || steps::monitor::run(runner));
    pipeline.add(steps::cleanup::NAME, || steps::cleanup::run(runner));

    pipeline.run()
}

/// Mail the full transcript; delivery failure never fails the run
fn deliver_report(session: &SessionLog, results: &[StepResult], cfg: &Config) {
    let hostname = fs::read_to_string("/etc/hostname")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let subject = report::subject(
        &hostname,
        &chrono::Local::now().format("%Y-%m-%d").to_string(),
        report::overall_os_status(results),
    );

    match session.transcript() {
        Ok(body) => {
            if let Err(e) = notifier::send(&cfg.mail_to, &subject, &body) {
                warn!("report delivery failed: {:#}", e);
            }
        }
        Err(e) => warn!("could not read transcript for mail body: {:#}", e),
    }
}
