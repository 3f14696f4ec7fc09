//! Version string extraction and patch increments.
//!
//! Versions are handled as dot-joined text rather than parsed records: only the
//! last component is interpreted as a number, everything before it is carried
//! through byte-for-byte.

use std::sync::OnceLock;

use regex::Regex;

/// Pattern of the marker line holding the stamped version.
const MARKER_PATTERN: &str = r#"#define VERSION "(.*)""#;

/// Minimum number of dot-separated components in a version string.
const MIN_COMPONENTS: usize = 3;

/// Errors raised when a version string cannot be incremented.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum VersionFormatError {
    /// Fewer than three dot-separated components.
    #[error("Invalid version format '{version}', expected X.Y.Z")]
    TooFewComponents { version: String },
    /// The last component is not a non-negative decimal integer.
    #[error("Invalid patch component '{patch}' in version '{version}'")]
    InvalidPatch { version: String, patch: String },
    /// Incrementing the patch component overflowed.
    #[error("Patch component of version '{version}' cannot be incremented further")]
    PatchOverflow { version: String },
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(MARKER_PATTERN).expect("version marker regex must compile"))
}

/// Find the first `#define VERSION "..."` line and return its quoted value verbatim.
pub fn extract_version(text: &str) -> Option<&str> {
    marker_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str())
}

/// Version used when no previous header provides one: `<base_prefix>.0`.
pub fn default_version(base_prefix: &str) -> String {
    format!("{base_prefix}.0")
}

/// Increment the last component of a dot-separated version.
///
/// Leading components are not validated or renormalized, so `"03.1.9"` becomes
/// `"03.1.10"`. Strings with fewer than three components are rejected.
pub fn increment_patch(version: &str) -> Result<String, VersionFormatError> {
    let parts: Vec<&str> = version.split('.').collect();
    let (patch, leading) = match parts.split_last() {
        Some(split) if parts.len() >= MIN_COMPONENTS => split,
        _ => {
            return Err(VersionFormatError::TooFewComponents {
                version: version.to_string(),
            });
        }
    };
    let next = parse_patch(patch)
        .ok_or_else(|| VersionFormatError::InvalidPatch {
            version: version.to_string(),
            patch: patch.to_string(),
        })?
        .checked_add(1)
        .ok_or_else(|| VersionFormatError::PatchOverflow {
            version: version.to_string(),
        })?;
    Ok(format!("{}.{next}", leading.join(".")))
}

fn parse_patch(text: &str) -> Option<u64> {
    // `u64::from_str` accepts a leading `+`, which a patch component must not carry.
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}
