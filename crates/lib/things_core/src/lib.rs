//! # things_core
//!
//! Command pipeline for driving the Things task manager: argument schemas,
//! sanitising, the script and URL executors, output parsing and auth.

pub mod auth;
pub mod error;
pub mod executor;
pub mod params;
pub mod parser;
pub mod payload;
pub mod sanitize;
pub mod schema;

pub use error::{ErrorKind, ExecutionError, FieldError, Result};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
