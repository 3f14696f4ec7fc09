//! Patch-version stamping for generated C headers.
//!
//! A build runs [`stamper::VersionStamper`] once: it reads the previous
//! `#define VERSION "X.Y.Z"` from the generated header, bumps the patch
//! component and rewrites the header with the new version and build date.

/// Settings resolution.
pub mod config;
/// Header loading, rendering and writing.
pub mod header;
/// Tracing subscriber setup.
pub mod logging;
/// The stamp pipeline.
pub mod stamper;
/// Build timestamp formatting.
pub mod timestamp;
/// Version extraction and increments.
pub mod version;

pub use config::{ConfigOverrides, StampConfig};
pub use stamper::{StampError, StampReport, VersionStamper};
