use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Release feed not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No stable releases found for pinned major version {0}")]
    NoVersionsForPin(u64),

    #[error("No stable releases found in the release catalog")]
    EmptyCatalog,

    #[error("versionsBelow must be between 1 and 10, got {0}")]
    InvalidVersionsBelow(u32),
}
