//! Build timestamp formatting with an injectable clock.

use time::{OffsetDateTime, format_description::FormatItem, macros::format_description};

/// `YYYY-MM-DD HH:MM`, 24-hour and zero-padded.
const BUILD_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Errors that may occur while formatting the build timestamp.
#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    #[error("Failed to format build timestamp: {0}")]
    Format(#[from] time::error::Format),
}

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Local wall-clock time, falling back to UTC when the local offset is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Format `clock.now()` as a build timestamp.
pub fn current_build_timestamp<C: Clock + ?Sized>(clock: &C) -> Result<String, TimestampError> {
    format_build_timestamp(clock.now())
}

/// Format an instant as a build timestamp in its own offset.
pub fn format_build_timestamp(at: OffsetDateTime) -> Result<String, TimestampError> {
    Ok(at.format(BUILD_DATE_FORMAT)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{UtcOffset, macros::datetime};

    #[test]
    fn formats_minutes_precision_zero_padded() {
        let at = datetime!(2024-03-05 07:04:59 UTC);
        assert_eq!(format_build_timestamp(at).unwrap(), "2024-03-05 07:04");
    }

    #[test]
    fn uses_24_hour_clock() {
        let at = datetime!(2023-11-14 22:13:20 UTC);
        assert_eq!(format_build_timestamp(at).unwrap(), "2023-11-14 22:13");
    }

    #[test]
    fn keeps_the_instant_offset() {
        let offset = UtcOffset::from_hms(2, 0, 0).unwrap();
        let at = datetime!(2023-12-31 23:30 UTC).to_offset(offset);
        assert_eq!(format_build_timestamp(at).unwrap(), "2024-01-01 01:30");
    }

    #[test]
    fn reads_from_injected_clock() {
        let clock = FixedClock(datetime!(2025-06-01 12:00 UTC));
        assert_eq!(current_build_timestamp(&clock).unwrap(), "2025-06-01 12:00");
    }

    #[test]
    fn system_clock_output_has_expected_shape() {
        let stamp = current_build_timestamp(&SystemClock).unwrap();
        assert_eq!(stamp.len(), 16);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[13..14], ":");
    }
}
