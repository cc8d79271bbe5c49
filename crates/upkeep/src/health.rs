//! Post-run health verification
//!
//! Purely observational: probes the expected services and local DNS
//! resolution after cleanup, accumulating failures for the report. Nothing
//! here remediates, and nothing here gates the report.

use std::collections::BTreeSet;
use tracing::{info, warn};
use upkeep_common::CommandRunner;

/// Which tool answered the DNS probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DnsMethod {
    Dig,
    Nslookup,
    None,
}

impl DnsMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DnsMethod::Dig => "dig",
            DnsMethod::Nslookup => "nslookup",
            DnsMethod::None => "no tool available",
        }
    }
}

/// Snapshot of service and DNS health, derived and never persisted
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub services_ok: bool,
    pub failed_services: BTreeSet<String>,
    pub dns_ok: bool,
    pub dns_method: DnsMethod,
}

/// Probe the expected services and local DNS resolution
pub fn check(runner: &CommandRunner, expected_services: &[String]) -> HealthStatus {
    let mut failed_services = BTreeSet::new();

    for service in expected_services {
        let probe = runner.run(&format!("systemctl is-active --quiet {}", service));
        if !probe.success() {
            warn!("service '{}' is not active", service);
            failed_services.insert(service.clone());
        }
    }

    let (dns_ok, dns_method) = check_dns(runner);

    let status = HealthStatus {
        services_ok: failed_services.is_empty(),
        failed_services,
        dns_ok,
        dns_method,
    };

    info!(
        "health: services {}, dns {} ({})",
        if status.services_ok { "ok" } else { "degraded" },
        if status.dns_ok { "ok" } else { "failing" },
        status.dns_method.as_str()
    );

    status
}

/// Resolve a known name through the local resolver, preferring dig
fn check_dns(runner: &CommandRunner) -> (bool, DnsMethod) {
    resolve_dns(
        runner.has_command("dig"),
        runner.has_command("nslookup"),
        || {
            let probe = runner.run("dig +short +time=3 +tries=1 example.com @127.0.0.1");
            probe.success() && !probe.output.trim().is_empty()
        },
        || runner.run("nslookup example.com 127.0.0.1").success(),
    )
}

/// The dig -> nslookup -> none fallback chain
///
/// A missing lookup tool is never a DNS failure; it only shows up as the
/// method in the report. The lookups are closures so the chain is testable
/// without either tool on the host.
pub(crate) fn resolve_dns<D, N>(
    has_dig: bool,
    has_nslookup: bool,
    dig_lookup: D,
    nslookup_lookup: N,
) -> (bool, DnsMethod)
where
    D: FnOnce() -> bool,
    N: FnOnce() -> bool,
{
    if has_dig {
        (dig_lookup(), DnsMethod::Dig)
    } else if has_nslookup {
        (nslookup_lookup(), DnsMethod::Nslookup)
    } else {
        (true, DnsMethod::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dig_is_preferred_when_both_tools_exist() {
        let (ok, method) = resolve_dns(true, true, || true, || panic!("nslookup not consulted"));
        assert!(ok);
        assert_eq!(method, DnsMethod::Dig);
    }

    #[test]
    fn test_nslookup_is_the_fallback() {
        let (ok, method) = resolve_dns(false, true, || panic!("dig absent"), || true);
        assert!(ok);
        assert_eq!(method, DnsMethod::Nslookup);
    }

    #[test]
    fn test_failing_lookup_is_reported_with_its_method() {
        let (ok, method) = resolve_dns(true, true, || false, || true);
        assert!(!ok);
        assert_eq!(method, DnsMethod::Dig);
    }

    #[test]
    fn test_no_tool_is_not_a_dns_failure() {
        let (ok, method) = resolve_dns(
            false,
            false,
            || panic!("dig absent"),
            || panic!("nslookup absent"),
        );
        assert!(ok);
        assert_eq!(method, DnsMethod::None);
    }
}
