pub mod config;
pub mod logging;
pub mod policy;
pub mod release;
pub mod report;
pub mod sync;
