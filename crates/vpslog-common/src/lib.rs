//! VPS Log Collector Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging setup for the collector workspace.
//!
//! - **Error Handling**: [`VpslogError`] and the [`Result`] alias
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`]

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{Result, VpslogError};
