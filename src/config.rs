//! Stamp settings: defaults, an optional TOML file and command-line overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Header path used when none is configured, relative to the working directory.
pub const DEFAULT_HEADER_PATH: &str = "include/version.h";
/// `MAJOR.MINOR` prefix of the version used when no header provides one.
pub const DEFAULT_BASE_PREFIX: &str = "3.0";

/// Errors that may occur while loading or validating settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the settings file.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to parse the settings file.
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// The base prefix is not two non-empty dot-separated components.
    #[error("Invalid base version prefix '{0}', expected MAJOR.MINOR")]
    InvalidBasePrefix(String),
}

/// Resolved settings for one stamp run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampConfig {
    /// Generated header to read and rewrite.
    pub header_path: PathBuf,
    /// Prefix of the default version, e.g. `"3.0"`.
    pub base_prefix: String,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            header_path: PathBuf::from(DEFAULT_HEADER_PATH),
            base_prefix: DEFAULT_BASE_PREFIX.to_string(),
        }
    }
}

/// On-disk shape of the settings file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    header: Option<PathBuf>,
    base: Option<String>,
}

/// Overrides layered on top of the defaults and settings file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub header_path: Option<PathBuf>,
    pub base_prefix: Option<String>,
}

impl StampConfig {
    /// Build settings from defaults, then the settings file, then explicit overrides.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match overrides.config_file.as_deref() {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        if let Some(header_path) = overrides.header_path {
            config.header_path = header_path;
        }
        if let Some(base_prefix) = overrides.base_prefix {
            config.base_prefix = base_prefix;
        }
        config.validated()
    }

    /// Load a TOML settings file, keeping defaults for missing keys.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: SettingsFile =
            toml::from_str(&text).map_err(|source| ConfigError::ParseToml {
                path: path.to_path_buf(),
                source,
            })?;
        let defaults = Self::default();
        Self {
            header_path: settings.header.unwrap_or(defaults.header_path),
            base_prefix: settings.base.unwrap_or(defaults.base_prefix),
        }
        .validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = self.base_prefix.split('.').collect();
        if parts.len() != 2 || parts.iter().any(|part| part.is_empty()) {
            return Err(ConfigError::InvalidBasePrefix(self.base_prefix));
        }
        Ok(self)
    }
}
