//! Version tags for the self-update protocol
//!
//! A build of the orchestrator carries a monotonically increasing integer
//! tag embedded as a plain string, so a downloaded candidate binary can be
//! scanned for it without being executed. An artifact that cannot declare
//! its own version is never trusted.

use regex::bytes::Regex;

/// Marker preceding the tag value inside a build artifact
pub const VERSION_MARKER: &str = "UPKEEP_VERSION_TAG=";

/// The tag carried by this build
pub const LOCAL_VERSION: u64 = 7;

/// The embedded tag string; digits must stay in sync with `LOCAL_VERSION`
pub const EMBEDDED_TAG: &str = "UPKEEP_VERSION_TAG=7";

/// Extract the version tag from a candidate artifact, if it declares one
pub fn extract_tag(artifact: &[u8]) -> Option<u64> {
    // Pattern assembled at runtime so its own bytes are not a tag
    let pattern = format!(r"{}(\d+)", regex::escape(VERSION_MARKER));
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(artifact)?;
    let digits = std::str::from_utf8(caps.get(1)?.as_bytes()).ok()?;
    digits.parse().ok()
}

/// Whether a candidate tag should replace the local one
pub fn is_newer(remote: u64, local: u64) -> bool {
    remote > local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_tag_matches_local_version() {
        assert_eq!(extract_tag(EMBEDDED_TAG.as_bytes()), Some(LOCAL_VERSION));
    }

    #[test]
    fn test_extract_tag_present() {
        let artifact = format!("binary junk {}42 more junk", VERSION_MARKER);
        assert_eq!(extract_tag(artifact.as_bytes()), Some(42));
    }

    #[test]
    fn test_extract_tag_absent() {
        assert_eq!(extract_tag(b"no tag in here"), None);
    }

    #[test]
    fn test_extract_tag_from_binary_bytes() {
        let mut artifact = vec![0u8, 159, 146, 150];
        artifact.extend_from_slice(EMBEDDED_TAG.as_bytes());
        artifact.extend_from_slice(&[255, 0, 17]);
        assert_eq!(extract_tag(&artifact), Some(LOCAL_VERSION));
    }

    #[test]
    fn test_is_newer_strictly_greater_only() {
        assert!(is_newer(2, 1));
        assert!(!is_newer(1, 1));
        assert!(!is_newer(1, 2));
    }
}
