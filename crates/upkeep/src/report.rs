//! Report assembly
//!
//! Renders the collected step results and health snapshot into the summary
//! block that ends the session log. Rendering is deterministic for a given
//! input sequence, so the format is covered by snapshot-style tests.

use crate::health::{DnsMethod, HealthStatus};
use crate::pipeline::StepResult;
use crate::steps::os_update;
use std::fmt::Write;

/// Render the ordered summary of one run
pub fn render(results: &[StepResult], health: &HealthStatus) -> String {
    let mut out = String::new();

    out.push_str("==== Maintenance summary ====\n");
    for result in results {
        let _ = write!(out, "{:<16} : {}", result.name, result.outcome.as_str());
        if result.detail.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, " ({})", result.detail);
        }
    }

    out.push_str("---- Health ----\n");
    if health.services_ok {
        out.push_str("Services         : OK\n");
    } else {
        let failed: Vec<&str> = health
            .failed_services
            .iter()
            .map(String::as_str)
            .collect();
        let _ = writeln!(out, "Services         : FAILED ({})", failed.join(", "));
    }

    match (health.dns_ok, health.dns_method) {
        (_, DnsMethod::None) => out.push_str("DNS              : not checked (no tool available)\n"),
        (true, method) => {
            let _ = writeln!(out, "DNS              : OK (via {})", method.as_str());
        }
        (false, method) => {
            let _ = writeln!(out, "DNS              : FAILED (via {})", method.as_str());
        }
    }

    out
}

/// Overall OS status for the mail subject
pub fn overall_os_status(results: &[StepResult]) -> &'static str {
    results
        .iter()
        .find(|r| r.name == os_update::NAME)
        .map(|r| r.outcome.as_str())
        .unwrap_or("Unknown")
}

/// Mail subject, parameterized by host, date and the OS step status
pub fn subject(hostname: &str, date: &str, os_status: &str) -> String {
    format!("Maintenance report {} {} - OS: {}", hostname, date, os_status)
}
