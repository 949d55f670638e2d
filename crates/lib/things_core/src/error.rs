//! Error taxonomy for the command pipeline.
//!
//! Every failure that can happen between receiving tool arguments and getting
//! a result back from Things is one of the [`ExecutionError`] variants. The
//! `Display` impl is the headline shown to the caller; raw detail (stderr,
//! lengths, field lists) is only exposed through [`ExecutionError::details`].

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Matches `execution error: <message> (<code>)` in script stderr.
static SCRIPT_ERROR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"execution error:\s*(.+?)\s*\(-?\d+\)").expect("static regex is valid")
});

/// A single violated constraint, addressed by its path in the argument tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Dotted path, e.g. `items[2].title`. Empty for object-level rules.
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    AuthRequired,
    ValidationFailed,
    Timeout,
    ScriptFailure,
    UrlTooLong,
    PayloadTooLarge,
    UnknownTool,
    Generic,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::AuthRequired => "AUTH_REQUIRED",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::ScriptFailure => "SCRIPT_FAILURE",
            ErrorKind::UrlTooLong => "URL_TOO_LONG",
            ErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorKind::UnknownTool => "UNKNOWN_TOOL",
            ErrorKind::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while validating, marshalling or executing a command.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Script not found: {resource}")]
    NotFound { resource: String },

    #[error("{0}")]
    AuthRequired(String),

    #[error("Invalid parameters: {}", join_field_errors(.0))]
    ValidationFailed(Vec<FieldError>),

    #[error("Operation timed out after {}ms: {operation}", .duration.as_millis())]
    Timeout {
        operation: String,
        duration: Duration,
    },

    #[error("{}", humanize_script_error(.script, .detail))]
    ScriptFailure { script: String, detail: String },

    #[error(
        "URL too long ({length} > {max} characters). Consider using fewer items or shorter text."
    )]
    UrlTooLong { length: usize, max: usize },

    #[error(
        "JSON payload too large ({length} > {max} characters). Consider splitting the request into smaller batches."
    )]
    PayloadTooLarge { length: usize, max: usize },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{message}")]
    Generic {
        message: String,
        command: Option<String>,
    },
}

impl ExecutionError {
    /// Validation failure for a single field.
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        ExecutionError::ValidationFailed(vec![FieldError::new(path, message)])
    }

    pub fn generic(message: impl Into<String>) -> Self {
        ExecutionError::Generic {
            message: message.into(),
            command: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::NotFound { .. } => ErrorKind::NotFound,
            ExecutionError::AuthRequired(_) => ErrorKind::AuthRequired,
            ExecutionError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            ExecutionError::Timeout { .. } => ErrorKind::Timeout,
            ExecutionError::ScriptFailure { .. } => ErrorKind::ScriptFailure,
            ExecutionError::UrlTooLong { .. } => ErrorKind::UrlTooLong,
            ExecutionError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            ExecutionError::UnknownTool(_) => ErrorKind::UnknownTool,
            ExecutionError::Generic { .. } => ErrorKind::Generic,
        }
    }

    /// Structured detail for logs and diagnostics. Never part of the headline.
    pub fn details(&self) -> Value {
        match self {
            ExecutionError::NotFound { resource } => json!({ "resource": resource }),
            ExecutionError::AuthRequired(_) => Value::Null,
            ExecutionError::ValidationFailed(errors) => json!({ "fields": errors }),
            ExecutionError::Timeout {
                operation,
                duration,
            } => json!({
                "operation": operation,
                "timeoutMs": duration.as_millis() as u64,
            }),
            ExecutionError::ScriptFailure { script, detail } => {
                json!({ "scriptName": script, "error": detail })
            }
            ExecutionError::UrlTooLong { length, max }
            | ExecutionError::PayloadTooLarge { length, max } => {
                json!({ "length": length, "max": max })
            }
            ExecutionError::UnknownTool(name) => json!({ "tool": name }),
            ExecutionError::Generic { command, .. } => match command {
                Some(command) => json!({ "command": command }),
                None => Value::Null,
            },
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Extract a readable message from raw script stderr.
///
/// Falls back to a generic message naming the script when the output does not
/// contain a recognisable `execution error:` clause.
pub fn humanize_script_error(script: &str, detail: &str) -> String {
    let Some(captures) = SCRIPT_ERROR_PATTERN.captures(detail) else {
        return format!("Script execution failed: {script}");
    };
    let message = captures.get(1).map(|m| m.as_str()).unwrap_or_default();

    if message.contains("is not running") {
        return "Things 3 is not running. Please open Things 3 and try again.".to_string();
    }
    message.to_string()
}
