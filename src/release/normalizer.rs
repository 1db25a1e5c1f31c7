//! Release catalog normalization
//!
//! Turns the raw feed into a descending list of stable releases with one
//! representative per group:
//!
//! 1. [`filter_stable`] drops unreleased, pre-release and malformed records
//! 2. [`parse_version`] reduces each record to `major.minor.patch`
//! 3. [`restrict_to_major`] applies the major-version pin, if any
//! 4. [`sort_descending`] orders newest first
//! 5. [`dedup_by_granularity`] keeps the highest release of each group

use std::sync::LazyLock;

use indexmap::IndexMap;
use indexmap::map::Entry;
use regex::Regex;

use crate::release::error::SelectionError;
use crate::release::types::{Granularity, ParsedVersion, ReleaseRecord, SelectionPolicy};

/// `major.minor` with an optional `.patch`, anchored at the start of the string
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)(?:\.(\d+))?").unwrap());

/// Keep only released records without pre-release markers whose version
/// starts with a numeric `major.minor`.
pub fn filter_stable(records: &[ReleaseRecord]) -> Vec<&ReleaseRecord> {
    records
        .iter()
        .filter(|record| record.released)
        .filter(|record| !record.has_prerelease_marker())
        .filter(|record| VERSION_PATTERN.is_match(&record.version))
        .collect()
}

/// Parse the leading `major.minor[.patch]` of a record's version string.
///
/// Returns `None` when the string doesn't match or a component overflows.
pub fn parse_version(record: &ReleaseRecord) -> Option<ParsedVersion> {
    let captures = VERSION_PATTERN.captures(&record.version)?;

    let major = captures.get(1)?.as_str().parse().ok()?;
    let minor = captures.get(2)?.as_str().parse().ok()?;
    let patch = match captures.get(3) {
        Some(patch) => patch.as_str().parse().ok()?,
        None => 0,
    };

    Some(
        ParsedVersion::new(major, minor, patch)
            .with_build(&record.build)
            .with_release_date(record.release_date_or_unknown()),
    )
}

/// Drop every version whose major differs from `pin`.
pub fn restrict_to_major(
    versions: Vec<ParsedVersion>,
    pin: u64,
) -> Result<Vec<ParsedVersion>, SelectionError> {
    let restricted: Vec<_> = versions
        .into_iter()
        .filter(|version| version.major() == pin)
        .collect();

    if restricted.is_empty() {
        return Err(SelectionError::NoVersionsForPin(pin));
    }

    Ok(restricted)
}

/// Sort newest first by `(major, minor, patch)`.
pub fn sort_descending(mut versions: Vec<ParsedVersion>) -> Vec<ParsedVersion> {
    versions.sort_by(|a, b| b.cmp(a));
    versions
}

/// Keep one representative per group key: the first one seen.
///
/// Expects input sorted by [`sort_descending`], so the first one seen is the
/// highest release of its group.
pub fn dedup_by_granularity(
    versions: Vec<ParsedVersion>,
    granularity: Granularity,
) -> Vec<ParsedVersion> {
    let mut groups = IndexMap::new();

    for version in versions {
        if let Entry::Vacant(entry) = groups.entry(version.group_key(granularity)) {
            entry.insert(version);
        }
    }

    groups.into_values().collect()
}

/// Run the full normalization pipeline for one policy.
///
/// An empty result means the feed had no stable releases. With a major pin,
/// an empty set is an error instead.
pub fn normalize(
    records: &[ReleaseRecord],
    policy: &SelectionPolicy,
) -> Result<Vec<ParsedVersion>, SelectionError> {
    let parsed: Vec<_> = filter_stable(records)
        .into_iter()
        .filter_map(parse_version)
        .collect();

    let parsed = match policy.pin_to_major_version() {
        Some(pin) => restrict_to_major(parsed, pin)?,
        None => parsed,
    };

    let representatives = dedup_by_granularity(sort_descending(parsed), policy.granularity());

    Ok(sort_descending(representatives))
}
