//! Release catalog layer
//!
//! Fetches OS release records and reduces them to a single target minimum
//! version.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Feed     │────▶│ Normalizer  │────▶│  Selector   │
//! │  (fetch)    │     │ (filter,    │     │ (N behind   │
//! └─────────────┘     │  group)     │     │  newest)    │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`feed`]: Feed trait for fetching release records
//! - [`feeds`]: Concrete feed implementations
//! - [`normalizer`]: Stable-release filtering, grouping and ordering
//! - [`selector`]: Trailing-window target selection
//! - [`error`]: Error types for feed and selection failures
//! - [`types`]: `ReleaseRecord`, `ParsedVersion` and `SelectionPolicy`
//!
//! Normalizer and selector are pure functions; only the feed performs I/O.

pub mod error;
pub mod feed;
pub mod feeds;
pub mod normalizer;
pub mod selector;
pub mod types;
