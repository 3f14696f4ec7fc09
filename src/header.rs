//! Reading and writing the generated version header.

use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::version::{default_version, extract_version};

/// Errors that may occur while reading or writing the header file.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    /// The existing header could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    /// The header's parent directory could not be created.
    #[error("Failed to create header directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: io::Error,
    },
    /// The header could not be written.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: io::Error,
    },
}

/// Where the current version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// The marker line of an existing header.
    Header,
    /// No header existed; the default version was used.
    Missing,
    /// A header existed without a marker line; the default version was used.
    NoMarker,
}

/// Version read from disk together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedVersion {
    pub version: String,
    pub source: VersionSource,
}

/// Read the current version from the header at `path`.
///
/// A missing file or a file without a `#define VERSION "..."` line yields
/// `<base_prefix>.0`. The extracted value is returned without validation.
pub fn load_current_version(path: &Path, base_prefix: &str) -> Result<LoadedVersion, HeaderError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            tracing::info!(
                "{} not found; starting with base version {}",
                path.display(),
                default_version(base_prefix)
            );
            return Ok(LoadedVersion {
                version: default_version(base_prefix),
                source: VersionSource::Missing,
            });
        }
        Err(source) => {
            return Err(HeaderError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    match extract_version(&text) {
        Some(version) => Ok(LoadedVersion {
            version: version.to_string(),
            source: VersionSource::Header,
        }),
        None => {
            tracing::warn!(
                "VERSION not found in {}. Starting with base version.",
                path.display()
            );
            Ok(LoadedVersion {
                version: default_version(base_prefix),
                source: VersionSource::NoMarker,
            })
        }
    }
}

/// Render the guarded `VERSION` and `BUILD_DATE` definitions.
pub fn render_header(version: &str, build_date: &str) -> String {
    format!(
        "\n#ifndef VERSION\n  #define VERSION \"{version}\"\n#endif\n\
         #ifndef BUILD_DATE\n  #define BUILD_DATE \"{build_date}\"\n#endif\n"
    )
}

/// Write `text` to `path`, creating parent directories and replacing any existing file.
pub fn write_header(path: &Path, text: &str) -> Result<(), HeaderError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| HeaderError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let map_write = |source: io::Error| HeaderError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::create(path).map_err(map_write)?;
    file.write_all(text.as_bytes()).map_err(map_write)?;
    file.flush().map_err(map_write)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn renders_exact_header_shape() {
        let text = render_header("3.0.1", "2024-01-02 03:04");
        assert_eq!(
            text,
            "\n#ifndef VERSION\n  #define VERSION \"3.0.1\"\n#endif\n#ifndef BUILD_DATE\n  #define BUILD_DATE \"2024-01-02 03:04\"\n#endif\n"
        );
    }

    #[test]
    fn rendered_header_reparses_to_same_version() {
        for version in ["3.0.1", "03.x.17", "1.2.3.4"] {
            let text = render_header(version, "2024-01-02 03:04");
            assert_eq!(extract_version(&text), Some(version));
        }
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = tempdir().unwrap();
        let loaded = load_current_version(&dir.path().join("version.h"), "3.0").unwrap();
        assert_eq!(loaded.version, "3.0.0");
        assert_eq!(loaded.source, VersionSource::Missing);
    }

    #[test]
    fn file_without_marker_yields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.h");
        fs::write(&path, "#pragma once\n#define BUILD_DATE \"2024-01-01 00:00\"\n").unwrap();
        let loaded = load_current_version(&path, "3.0").unwrap();
        assert_eq!(loaded.version, "3.0.0");
        assert_eq!(loaded.source, VersionSource::NoMarker);
    }

    #[test]
    fn marker_value_is_returned_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("version.h");
        fs::write(&path, render_header("1.2", "2024-01-01 00:00")).unwrap();
        let loaded = load_current_version(&path, "3.0").unwrap();
        assert_eq!(loaded.version, "1.2");
        assert_eq!(loaded.source, VersionSource::Header);
    }

    #[test]
    fn directory_in_place_of_header_is_a_read_error() {
        let dir = tempdir().unwrap();
        let result = load_current_version(dir.path(), "3.0");
        assert!(matches!(result, Err(HeaderError::Read { .. })));
    }

    #[test]
    fn write_creates_parent_dirs_and_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("include").join("nested").join("version.h");
        write_header(&path, "first").unwrap();
        write_header(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn write_into_file_parent_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("include");
        fs::write(&blocker, "not a directory").unwrap();
        let result = write_header(&blocker.join("version.h"), "text");
        assert!(matches!(result, Err(HeaderError::CreateDir { .. })));
    }
}
