//! Auth token lookup and the per-command auth policy.
//!
//! The token is resolved from its source on every call and never cached or
//! logged.

use crate::error::{ExecutionError, Result};
use crate::payload::JsonItem;

/// Environment variable holding the Things URL-scheme token.
pub const DEFAULT_TOKEN_VAR: &str = "THINGS_AUTH_TOKEN";

const MIN_TOKEN_LEN: usize = 10;

/// Flat URL commands that mutate existing items.
const AUTH_COMMANDS: &[&str] = &["update", "update-project"];

/// JSON-mode operation that needs the token.
const AUTH_OPERATION: &str = "update";

/// Where the token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Read the named environment variable at call time.
    Env(String),
    /// A fixed value (tests, embedding).
    Fixed(Option<String>),
}

#[derive(Debug, Clone)]
pub struct AuthGate {
    source: TokenSource,
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::from_env(DEFAULT_TOKEN_VAR)
    }
}

impl AuthGate {
    pub fn new(source: TokenSource) -> Self {
        Self { source }
    }

    pub fn from_env(var: impl Into<String>) -> Self {
        Self::new(TokenSource::Env(var.into()))
    }

    pub fn fixed(token: Option<&str>) -> Self {
        Self::new(TokenSource::Fixed(token.map(str::to_string)))
    }

    fn var_name(&self) -> &str {
        match &self.source {
            TokenSource::Env(var) => var,
            TokenSource::Fixed(_) => DEFAULT_TOKEN_VAR,
        }
    }

    /// Resolve and validate the token.
    pub fn get_token(&self) -> Result<String> {
        let token = match &self.source {
            TokenSource::Env(var) => std::env::var(var).ok(),
            TokenSource::Fixed(token) => token.clone(),
        }
        .filter(|t| !t.is_empty());

        let var = self.var_name();
        let Some(token) = token else {
            return Err(ExecutionError::AuthRequired(format!(
                "{var} not configured. Get your token from Things → Settings → General → Enable Things URLs → Manage"
            )));
        };

        let well_formed = token.len() >= MIN_TOKEN_LEN
            && token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !well_formed {
            return Err(ExecutionError::AuthRequired(format!(
                "Invalid auth token format. Please check your {var} in MCP settings."
            )));
        }

        Ok(token)
    }

    /// Whether the flat URL command `command` must carry the token.
    pub fn requires_auth(&self, command: &str) -> bool {
        AUTH_COMMANDS.contains(&command)
    }

    /// Whether a JSON-mode payload must carry the token.
    pub fn requires_auth_for_items(&self, items: &[JsonItem]) -> bool {
        items
            .iter()
            .any(|item| item.operation.as_deref() == Some(AUTH_OPERATION))
    }
}
