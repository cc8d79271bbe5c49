//! Orchestrator configuration
//!
//! Configuration lives in /etc/upkeep/config.toml. A missing file yields
//! the defaults below; a malformed file is a fatal precondition, because an
//! unattended run must never guess at half-read settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// System configuration directory
pub const SYSTEM_CONFIG_DIR: &str = "/etc/upkeep";
const CONFIG_FILE: &str = "config.toml";

/// Placeholder meaning "self-update source not set up"
pub const UPDATE_URL_UNCONFIGURED: &str = "UNCONFIGURED";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Session log path (also the mail report body)
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,

    /// Run lock path
    #[serde(default = "default_lock_path")]
    pub lock_path: PathBuf,

    /// Recipient of the maintenance report
    #[serde(default = "default_mail_to")]
    pub mail_to: String,

    /// Where to fetch a candidate build of the orchestrator
    ///
    /// The version the candidate is compared against is always the tag
    /// embedded in the running binary, never a configured value: a stale
    /// number here would survive the binary swap and re-apply forever.
    #[serde(default = "default_update_url")]
    pub update_url: String,

    /// Minimum free space on / before a run may proceed (MB)
    #[serde(default = "default_min_free_disk_mb")]
    pub min_free_disk_mb: u64,

    /// Host pinged once to confirm network reachability
    #[serde(default = "default_connectivity_host")]
    pub connectivity_host: String,

    /// Services that must be active after the run
    #[serde(default = "default_expected_services")]
    pub expected_services: Vec<String>,

    /// Where timestamped settings backups are kept
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    /// How many backup artifacts to retain
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,

    /// Directory holding the resolver root hints
    #[serde(default = "default_root_hints_dir")]
    pub root_hints_dir: PathBuf,

    /// Where fresh root hints are fetched from
    #[serde(default = "default_root_hints_url")]
    pub root_hints_url: String,

    /// Whether the run ends in a reboot
    #[serde(default = "default_reboot_enabled")]
    pub reboot_enabled: bool,
}

fn default_log_path() -> PathBuf {
    PathBuf::from("/var/log/upkeep/run.log")
}

fn default_lock_path() -> PathBuf {
    PathBuf::from("/run/upkeep/upkeep.lock")
}

fn default_mail_to() -> String {
    "root".to_string()
}

fn default_update_url() -> String {
    UPDATE_URL_UNCONFIGURED.to_string()
}

fn default_min_free_disk_mb() -> u64 {
    512
}

fn default_connectivity_host() -> String {
    "1.1.1.1".to_string()
}

fn default_expected_services() -> Vec<String> {
    vec![
        "pihole-FTL".to_string(),
        "unbound".to_string(),
        "rpimonitor".to_string(),
    ]
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("/var/backups/upkeep")
}

fn default_backup_retention() -> usize {
    5
}

fn default_root_hints_dir() -> PathBuf {
    PathBuf::from("/var/lib/unbound")
}

fn default_root_hints_url() -> String {
    "https://www.internic.net/domain/named.root".to_string()
}

fn default_reboot_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            lock_path: default_lock_path(),
            mail_to: default_mail_to(),
            update_url: default_update_url(),
            min_free_disk_mb: default_min_free_disk_mb(),
            connectivity_host: default_connectivity_host(),
            expected_services: default_expected_services(),
            backup_dir: default_backup_dir(),
            backup_retention: default_backup_retention(),
            root_hints_dir: default_root_hints_dir(),
            root_hints_url: default_root_hints_url(),
            reboot_enabled: default_reboot_enabled(),
        }
    }
}

impl Config {
    /// Load from the system path, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Path::new(SYSTEM_CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from an explicit path (absent file means defaults)
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Whether a self-update source has been set up
    pub fn update_configured(&self) -> bool {
        !self.update_url.is_empty() && self.update_url != UPDATE_URL_UNCONFIGURED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.backup_retention, 5);
        assert_eq!(cfg.min_free_disk_mb, 512);
        assert!(!cfg.update_configured());
        assert!(cfg.reboot_enabled);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let cfg = Config::load_from(&temp.path().join("nope.toml")).unwrap();
        assert_eq!(cfg.mail_to, "root");
    }

    #[test]
    fn test_sparse_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "mail_to = \"admin@example.net\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.mail_to, "admin@example.net");
        assert_eq!(cfg.backup_retention, 5);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "mail_to = [broken\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_leftover_version_pin_is_ignored() {
        // Older configs carried a version number; it must not influence
        // anything, the running binary's embedded tag is authoritative
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "local_version = 1\n").unwrap();

        assert!(Config::load_from(&path).is_ok());
    }

    #[test]
    fn test_update_configured() {
        let mut cfg = Config::default();
        assert!(!cfg.update_configured());
        cfg.update_url = "https://example.net/upkeep".to_string();
        assert!(cfg.update_configured());
    }
}
