//! Release feed implementations

pub mod http;

pub use http::HttpReleaseFeed;
