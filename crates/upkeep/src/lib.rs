//! Upkeep - unattended maintenance orchestrator for a headless appliance
//!
//! One run self-updates the orchestrator, applies OS and application
//! updates, reclaims disk space, verifies service health, mails a summary
//! and reboots. Steps are strictly sequential and individually isolated: a
//! failed step never stops the ones after it, it only shows up honestly in
//! the report.

pub mod cli;
pub mod health;
pub mod logging;
pub mod notifier;
pub mod orchestrator;
pub mod pipeline;
pub mod preflight;
pub mod reboot;
pub mod report;
pub mod self_update;
pub mod steps;
