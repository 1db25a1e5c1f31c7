//! Target version selection over a normalized catalog

use crate::release::error::SelectionError;
use crate::release::types::ParsedVersion;

/// Fewer distinct versions were available than the requested offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientHistory {
    pub available: usize,
    pub requested: u32,
}

/// Outcome of a successful selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The version to enforce as the minimum
    pub target: ParsedVersion,
    /// The newest version in the catalog
    pub latest: ParsedVersion,
    /// Set when the catalog was too short and the oldest version was used instead
    pub insufficient_history: Option<InsufficientHistory>,
}

impl Selection {
    pub fn target_version(&self) -> String {
        self.target.full_version()
    }

    pub fn latest_version(&self) -> String {
        self.latest.full_version()
    }

    pub fn is_degraded(&self) -> bool {
        self.insufficient_history.is_some()
    }
}

/// Select the version `versions_below` positions behind the newest.
///
/// `versions` must be the normalizer output: newest first, one entry per group.
/// When there are not more than `versions_below` entries, the oldest one is
/// selected and the selection is marked with [`InsufficientHistory`].
pub fn select_target(
    versions: &[ParsedVersion],
    versions_below: u32,
) -> Result<Selection, SelectionError> {
    let (Some(latest), Some(oldest)) = (versions.first(), versions.last()) else {
        return Err(SelectionError::EmptyCatalog);
    };

    let offset = versions_below as usize;

    let (target, insufficient_history) = match versions.get(offset) {
        Some(target) => (target, None),
        None => (
            oldest,
            Some(InsufficientHistory {
                available: versions.len(),
                requested: versions_below,
            }),
        ),
    };

    Ok(Selection {
        target: target.clone(),
        latest: latest.clone(),
        insufficient_history,
    })
}
