//! Compliance policy service layer
//!
//! - [`auth`]: Bearer token acquisition
//! - [`store`]: Policy store trait
//! - [`graph`]: Graph API implementation of the store
//! - [`types`]: Policy record and update payload
//! - [`error`]: Error types for policy operations

pub mod auth;
pub mod error;
pub mod graph;
pub mod store;
pub mod types;
