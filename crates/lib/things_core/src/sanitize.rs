//! String sanitising for values that cross a process or URL boundary.

use uuid::Uuid;

use crate::error::{ExecutionError, Result};

/// Maximum length of a single script argument.
pub const MAX_TRANSPORT_ARG_LEN: usize = 255;

/// Length of a hyphenated identifier (`8-4-4-4-12`).
const IDENTIFIER_LEN: usize = 36;

fn is_safe_arg_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() || matches!(c, '-' | '.' | '@')
}

/// Validate a value destined for a script command line.
///
/// Only letters, digits, underscores, whitespace, hyphens, dots and `@` are
/// accepted; the value is returned unchanged when it passes.
pub fn sanitize_for_transport_arg<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(ExecutionError::validation(
            field,
            format!("{field} cannot be empty"),
        ));
    }

    if value.chars().count() > MAX_TRANSPORT_ARG_LEN {
        return Err(ExecutionError::validation(
            field,
            format!("{field} is too long (max {MAX_TRANSPORT_ARG_LEN} characters)"),
        ));
    }

    if !value.chars().all(is_safe_arg_char) {
        return Err(ExecutionError::validation(
            field,
            format!(
                "{field} contains invalid characters. Only letters, numbers, spaces, hyphens, dots, and @ are allowed."
            ),
        ));
    }

    Ok(value)
}

/// Strip control characters except tab, newline and carriage return.
pub fn sanitize_for_url(value: &str) -> String {
    value
        .chars()
        .filter(|&c| !(c.is_ascii_control() && !matches!(c, '\t' | '\n' | '\r')))
        .collect()
}

/// Check that `id` is a hyphenated `8-4-4-4-12` hex identifier.
pub fn validate_identifier_format(id: &str) -> Result<&str> {
    if id.len() == IDENTIFIER_LEN && Uuid::try_parse(id).is_ok() {
        return Ok(id);
    }
    Err(ExecutionError::validation(
        "id",
        "Invalid Things ID format. Expected format: XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX",
    ))
}
