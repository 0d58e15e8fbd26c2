//! Chart filename parsing.
//!
//! Archive filenames embed both the chart name and its version, separated
//! by `-` (e.g. `my-chart-1.2.3.tgz`). Because chart names may themselves
//! contain dashes, the split point is the first dash-separated token that
//! looks like a dotted version number. The same heuristic is used by the
//! upload path and the rebuild scan so both always agree on the
//! (chart, version) pair for a given filename.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// A token starts the version when it begins with at least three
/// dot-separated groups of decimal digits (e.g. `1.2.3`, `10.0.0.1`).
static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+\.){2,}[0-9]+").expect("version pattern is valid"));

/// A chart name and version extracted from a filename stem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameVersion {
    /// Chart name (may contain dashes).
    pub chart: String,
    /// Version string; empty when no version token was found.
    pub version: String,
}

impl NameVersion {
    /// Whether a version was found in the filename.
    pub fn has_version(&self) -> bool {
        !self.version.is_empty()
    }
}

/// Split a filename stem (extension already stripped) into chart name and
/// version.
///
/// Tokens are scanned left to right; the chart name is the longest prefix
/// of tokens that does not yet look like a version. Once a version-shaped
/// token is seen, it and all remaining tokens form the version. If no
/// token matches, the whole stem is the chart name and the version is
/// empty; callers must treat that as "not a versioned archive".
pub fn split_name_version(stem: &str) -> NameVersion {
    let mut chart = Vec::new();
    let mut version = Vec::new();

    let mut in_name = true;
    for token in stem.split('-') {
        if in_name && VERSION_TOKEN.is_match(token) {
            in_name = false;
        }
        if in_name {
            chart.push(token);
        } else {
            version.push(token);
        }
    }

    NameVersion {
        chart: chart.join("-"),
        version: version.join("-"),
    }
}

/// Parse and validate an archive filename.
///
/// Checks the expected extension and that the stem carries a non-empty
/// version. This is the shared validation entry point for uploads.
pub fn parse_archive_filename(filename: &str, extension: &str) -> Result<NameVersion> {
    let stem = filename
        .strip_suffix(extension)
        .ok_or_else(|| Error::InvalidFilename(format!("expected {extension}: {filename}")))?;

    let parsed = split_name_version(stem);
    if !parsed.has_version() {
        return Err(Error::InvalidFilename(format!(
            "no version in filename: {filename}"
        )));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_and_version() {
        let nv = split_name_version("mychart-1.2.3");
        assert_eq!(nv.chart, "mychart");
        assert_eq!(nv.version, "1.2.3");
    }

    #[test]
    fn dashed_name_and_prerelease_version() {
        let nv = split_name_version("my-chart-name-2.0.0-beta.1");
        assert_eq!(nv.chart, "my-chart-name");
        assert_eq!(nv.version, "2.0.0-beta.1");
    }

    #[test]
    fn no_version_token() {
        let nv = split_name_version("nodash");
        assert_eq!(nv.chart, "nodash");
        assert_eq!(nv.version, "");
        assert!(!nv.has_version());
    }

    #[test]
    fn two_component_number_is_not_a_version() {
        // 1.2 has only two dot-separated groups, so it stays in the name.
        let nv = split_name_version("app-1.2");
        assert_eq!(nv.chart, "app-1.2");
        assert_eq!(nv.version, "");
    }

    #[test]
    fn four_component_version() {
        let nv = split_name_version("tool-10.0.0.1");
        assert_eq!(nv.chart, "tool");
        assert_eq!(nv.version, "10.0.0.1");
    }

    #[test]
    fn parse_archive_filename_ok() {
        let nv = parse_archive_filename("foo-1.0.0.tgz", ".tgz").unwrap();
        assert_eq!(nv.chart, "foo");
        assert_eq!(nv.version, "1.0.0");
    }

    #[test]
    fn parse_archive_filename_wrong_extension() {
        let err = parse_archive_filename("foo-1.0.0.zip", ".tgz").unwrap_err();
        assert!(matches!(err, Error::InvalidFilename(_)));
    }

    #[test]
    fn parse_archive_filename_missing_version() {
        let err = parse_archive_filename("foo.tgz", ".tgz").unwrap_err();
        assert!(matches!(err, Error::InvalidFilename(_)));
    }
}
