//! Command executors: local scripts and the Things URL scheme.

pub mod script;
pub mod url;

pub use script::{RunOptions, ScriptExecutor, ScriptExecutorConfig};
pub use url::{SystemOpener, UrlExecutor, UrlExecutorConfig, UrlOpener};
