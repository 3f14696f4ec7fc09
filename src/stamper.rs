//! The stamp pipeline: load, increment, timestamp, render, write.

use std::path::PathBuf;

use crate::config::{ConfigError, ConfigOverrides, StampConfig};
use crate::header::{self, HeaderError, VersionSource};
use crate::timestamp::{self, Clock, SystemClock, TimestampError};
use crate::version::{self, VersionFormatError};

/// Any failure that aborts a stamp run.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Format(#[from] VersionFormatError),
    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// Outcome of a completed stamp run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampReport {
    pub header_path: PathBuf,
    pub source: VersionSource,
    pub previous: String,
    pub next: String,
    pub build_date: String,
    /// Rendered header text.
    pub header: String,
    /// False for dry runs.
    pub written: bool,
}

/// Bumps the patch version stored in a generated header.
pub struct VersionStamper<C = SystemClock> {
    config: StampConfig,
    clock: C,
    dry_run: bool,
}

impl VersionStamper<SystemClock> {
    pub fn new(config: StampConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    /// Resolve settings from `overrides` and build a stamper on the system clock.
    pub fn from_overrides(overrides: ConfigOverrides) -> Result<Self, StampError> {
        Ok(Self::new(StampConfig::resolve(overrides)?))
    }
}

impl<C: Clock> VersionStamper<C> {
    pub fn with_clock(config: StampConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            dry_run: false,
        }
    }

    /// Compute and render everything but leave the header on disk untouched.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    /// Run the pipeline once. A malformed version aborts before anything is written.
    pub fn run(&self) -> Result<StampReport, StampError> {
        let path = &self.config.header_path;
        let loaded = header::load_current_version(path, &self.config.base_prefix)?;
        tracing::info!("Current version: {}", loaded.version);

        let next = version::increment_patch(&loaded.version)?;
        tracing::info!("New version: {next}");

        let build_date = timestamp::current_build_timestamp(&self.clock)?;
        let text = header::render_header(&next, &build_date);

        if self.dry_run {
            tracing::info!("Dry run; {} left unchanged:{text}", path.display());
        } else {
            header::write_header(path, &text)?;
            tracing::info!(
                "Updated {} with version {next} and build date {build_date}",
                path.display()
            );
        }

        Ok(StampReport {
            header_path: path.clone(),
            source: loaded.source,
            previous: loaded.version,
            next,
            build_date,
            header: text,
            written: !self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::FixedClock;
    use std::fs;
    use tempfile::tempdir;
    use time::macros::datetime;

    fn stamper_for(path: PathBuf) -> VersionStamper<FixedClock> {
        let config = StampConfig {
            header_path: path,
            ..StampConfig::default()
        };
        VersionStamper::with_clock(config, FixedClock(datetime!(2024-05-06 07:08 UTC)))
    }

    #[test]
    fn report_describes_the_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.h");
        let report = stamper_for(path.clone()).run().unwrap();
        assert_eq!(report.source, VersionSource::Missing);
        assert_eq!(report.previous, "3.0.0");
        assert_eq!(report.next, "3.0.1");
        assert_eq!(report.build_date, "2024-05-06 07:08");
        assert!(report.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), report.header);
    }

    #[test]
    fn dry_run_leaves_disk_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("include").join("version.h");
        let report = stamper_for(path.clone()).dry_run(true).run().unwrap();
        assert!(!report.written);
        assert_eq!(report.next, "3.0.1");
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[test]
    fn consecutive_runs_keep_incrementing() {
        let dir = tempdir().unwrap();
        let stamper = stamper_for(dir.path().join("version.h"));
        let versions: Vec<String> = (0..3).map(|_| stamper.run().unwrap().next).collect();
        assert_eq!(versions, ["3.0.1", "3.0.2", "3.0.3"]);
    }

    #[test]
    fn from_overrides_applies_settings() {
        let stamper = VersionStamper::from_overrides(ConfigOverrides {
            header_path: Some(PathBuf::from("gen/version.h")),
            base_prefix: Some("4.2".to_string()),
            ..ConfigOverrides::default()
        })
        .unwrap();
        assert_eq!(stamper.config().header_path, PathBuf::from("gen/version.h"));
        assert_eq!(stamper.config().base_prefix, "4.2");
    }

    #[test]
    fn from_overrides_reports_config_errors() {
        let result = VersionStamper::from_overrides(ConfigOverrides {
            base_prefix: Some("4".to_string()),
            ..ConfigOverrides::default()
        });
        assert!(matches!(
            result,
            Err(StampError::Config(ConfigError::InvalidBasePrefix(_)))
        ));
    }

    #[test]
    fn format_error_is_reported_as_such() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.h");
        fs::write(&path, "#define VERSION \"7\"\n").unwrap();
        let err = stamper_for(path).run().unwrap_err();
        assert!(matches!(
            err,
            StampError::Format(VersionFormatError::TooFewComponents { .. })
        ));
    }
}
