//! Common types for release data and selection policy

use std::fmt;

use semver::Version;
use serde::Deserialize;

use crate::release::error::SelectionError;

/// Sentinel shown when a release record carries no date
pub const UNKNOWN_RELEASE_DATE: &str = "Unknown";

/// Smallest accepted versions-below offset
pub const MIN_VERSIONS_BELOW: u32 = 1;

/// Largest accepted versions-below offset
pub const MAX_VERSIONS_BELOW: u32 = 10;

/// Substrings in a version string that mark a pre-release build
const PRERELEASE_MARKERS: &[&str] = &["beta", "rc", "preview", "seed"];

/// One entry of the upstream release feed
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct ReleaseRecord {
    pub version: String,
    pub build: String,
    pub released: bool,
    pub beta: bool,
    pub rc: bool,
    pub release_date: Option<String>,
}

impl ReleaseRecord {
    /// Creates a released, non-beta record. Mostly useful for tests and fixtures.
    pub fn released(version: &str, build: &str) -> Self {
        Self {
            version: version.to_string(),
            build: build.to_string(),
            released: true,
            ..Default::default()
        }
    }

    /// Returns true when the record is flagged or named as a beta, RC, preview or seed build
    pub fn has_prerelease_marker(&self) -> bool {
        if self.beta || self.rc {
            return true;
        }
        let version = self.version.to_lowercase();
        PRERELEASE_MARKERS
            .iter()
            .any(|marker| version.contains(marker))
    }

    pub fn release_date_or_unknown(&self) -> &str {
        self.release_date.as_deref().unwrap_or(UNKNOWN_RELEASE_DATE)
    }
}

/// A stable release reduced to its numeric `major.minor.patch` form.
///
/// Ordering and equality only consider the numeric triple; `build` and
/// `release_date` are carried along for display.
#[derive(Debug, Clone)]
pub struct ParsedVersion {
    version: Version,
    pub build: String,
    pub release_date: String,
}

impl ParsedVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            version: Version::new(major, minor, patch),
            build: String::new(),
            release_date: UNKNOWN_RELEASE_DATE.to_string(),
        }
    }

    pub fn with_build(mut self, build: &str) -> Self {
        self.build = build.to_string();
        self
    }

    pub fn with_release_date(mut self, release_date: &str) -> Self {
        self.release_date = release_date.to_string();
        self
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    /// Canonical `major.minor.patch` string
    pub fn full_version(&self) -> String {
        self.version.to_string()
    }

    /// Key used to group versions under the given granularity
    pub fn group_key(&self, granularity: Granularity) -> (u64, Option<u64>) {
        match granularity {
            Granularity::Major => (self.major(), None),
            Granularity::Minor => (self.major(), Some(self.minor())),
        }
    }
}

impl PartialEq for ParsedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for ParsedVersion {}

impl PartialOrd for ParsedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParsedVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version.cmp(&other.version)
    }
}

impl fmt::Display for ParsedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}

/// How versions are grouped before selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// One representative per major version
    Major,
    /// One representative per major.minor pair
    Minor,
}

/// Trailing-window policy used to pick the target minimum version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
    versions_below: u32,
    use_minor_versions: bool,
    pin_to_major_version: Option<u64>,
}

impl SelectionPolicy {
    /// Builds a policy, rejecting offsets outside 1..=10.
    ///
    /// A pin of `Some(0)` is treated as disabled.
    pub fn new(
        versions_below: u32,
        use_minor_versions: bool,
        pin_to_major_version: Option<u64>,
    ) -> Result<Self, SelectionError> {
        if !(MIN_VERSIONS_BELOW..=MAX_VERSIONS_BELOW).contains(&versions_below) {
            return Err(SelectionError::InvalidVersionsBelow(versions_below));
        }

        Ok(Self {
            versions_below,
            use_minor_versions,
            pin_to_major_version: pin_to_major_version.filter(|major| *major > 0),
        })
    }

    pub fn versions_below(&self) -> u32 {
        self.versions_below
    }

    pub fn use_minor_versions(&self) -> bool {
        self.use_minor_versions
    }

    pub fn pin_to_major_version(&self) -> Option<u64> {
        self.pin_to_major_version
    }

    /// Pinning always groups by major.minor, regardless of `use_minor_versions`
    pub fn granularity(&self) -> Granularity {
        if self.pin_to_major_version.is_some() || self.use_minor_versions {
            Granularity::Minor
        } else {
            Granularity::Major
        }
    }
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            versions_below: 2,
            use_minor_versions: false,
            pin_to_major_version: None,
        }
    }
}
