//! URL-scheme executor.
//!
//! Flat mode encodes [`CommandParameters`] as query parameters of
//! `things:///<command>`; JSON mode sends an ordered list of [`JsonItem`]s as
//! the `data` parameter of `things:///json`. Both modes consult the same
//! [`AuthGate`] and put `auth-token` first when a token is required.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::auth::AuthGate;
use crate::error::{ExecutionError, Result};
use crate::params::{CommandParameters, ParamValue};
use crate::payload::JsonItem;
use crate::sanitize::sanitize_for_url;

/// Length cap for flat-mode URLs.
pub const MAX_URL_LENGTH: usize = 2048;

/// Length cap for JSON-mode URLs.
pub const MAX_JSON_URL_LENGTH: usize = MAX_URL_LENGTH * 4;

const JSON_COMMAND: &str = "json";

/// Characters left unescaped, matching JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Hands a finished URL to the operating system.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Opens URLs with `open` on macOS and `xdg-open` elsewhere.
#[derive(Debug, Default)]
pub struct SystemOpener;

#[async_trait]
impl UrlOpener for SystemOpener {
    async fn open(&self, url: &str) -> std::io::Result<()> {
        let program = if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        };
        let output = Command::new(program)
            .arg(url)
            .kill_on_drop(true)
            .output()
            .await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

/// Configuration for [`UrlExecutor`].
#[derive(Clone, Debug)]
pub struct UrlExecutorConfig {
    /// URL scheme, without `:`.
    pub scheme: String,
    pub max_url_length: usize,
    pub max_json_url_length: usize,
    pub open_timeout: Duration,
    pub json_open_timeout: Duration,
}

impl Default for UrlExecutorConfig {
    fn default() -> Self {
        Self {
            scheme: "things".into(),
            max_url_length: MAX_URL_LENGTH,
            max_json_url_length: MAX_JSON_URL_LENGTH,
            open_timeout: Duration::from_secs(5),
            json_open_timeout: Duration::from_secs(10),
        }
    }
}

/// Wire key and list separator for a logical parameter name.
fn wire_key(key: &str) -> (String, &'static str) {
    match key {
        "tags" | "tag_names" => ("tags".into(), ","),
        "checklist_items" => ("checklist-items".into(), "\n"),
        "todos" => ("to-dos".into(), "\n"),
        "filter" => ("filter".into(), ","),
        other => (other.replace('_', "-"), ","),
    }
}

#[derive(Clone)]
pub struct UrlExecutor {
    config: UrlExecutorConfig,
    auth: AuthGate,
    opener: Arc<dyn UrlOpener>,
}

impl UrlExecutor {
    pub fn new(config: UrlExecutorConfig, auth: AuthGate, opener: Arc<dyn UrlOpener>) -> Self {
        Self {
            config,
            auth,
            opener,
        }
    }

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    /// Assemble `scheme:///command?query` from already-encoded pairs.
    fn assemble(&self, command: &str, pairs: &[(String, String)]) -> Result<String> {
        let mut url = format!("{}:///{command}", self.config.scheme);
        if !pairs.is_empty() {
            let query = pairs
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }

        url::Url::parse(&url).map_err(|e| ExecutionError::Generic {
            message: format!("Failed to build Things URL: {e}"),
            command: Some(command.to_string()),
        })?;
        Ok(url)
    }

    fn auth_pair(&self) -> Result<(String, String)> {
        Ok(("auth-token".to_string(), encode(&self.auth.get_token()?)))
    }

    /// Build the flat-mode URL for `command` without opening it.
    pub fn build_url(&self, command: &str, params: &CommandParameters) -> Result<String> {
        let mut pairs = Vec::with_capacity(params.len() + 1);
        if self.auth.requires_auth(command) {
            pairs.push(self.auth_pair()?);
        }

        for (key, value) in params.iter() {
            match value {
                ParamValue::Bool(b) => pairs.push((key.replace('_', "-"), b.to_string())),
                ParamValue::Number(n) => pairs.push((key.replace('_', "-"), n.to_string())),
                ParamValue::Text(text) => {
                    pairs.push((key.replace('_', "-"), encode(&sanitize_for_url(text))))
                }
                ParamValue::List(items) if items.is_empty() => {}
                ParamValue::List(items) => {
                    let (wire, separator) = wire_key(key);
                    let joined = items
                        .iter()
                        .map(|item| sanitize_for_url(item))
                        .collect::<Vec<_>>()
                        .join(separator);
                    pairs.push((wire, encode(&joined)));
                }
            }
        }

        let url = self.assemble(command, &pairs)?;
        if url.len() > self.config.max_url_length {
            return Err(ExecutionError::UrlTooLong {
                length: url.len(),
                max: self.config.max_url_length,
            });
        }
        Ok(url)
    }

    /// Build the JSON-mode URL for `items` without opening it.
    pub fn build_json_url(&self, items: &[JsonItem]) -> Result<String> {
        let mut pairs = Vec::with_capacity(2);
        if self.auth.requires_auth_for_items(items) {
            pairs.push(self.auth_pair()?);
        }

        let data = serde_json::to_string(items).map_err(|e| ExecutionError::Generic {
            message: format!("Failed to serialise JSON payload: {e}"),
            command: Some(JSON_COMMAND.to_string()),
        })?;
        pairs.push(("data".to_string(), encode(&data)));

        let url = self.assemble(JSON_COMMAND, &pairs)?;
        if url.len() > self.config.max_json_url_length {
            return Err(ExecutionError::PayloadTooLarge {
                length: url.len(),
                max: self.config.max_json_url_length,
            });
        }
        Ok(url)
    }

    async fn open(&self, command: &str, url: &str, limit: Duration) -> Result<()> {
        debug!(command, length = url.len(), "Opening Things URL");
        let failed = |message: String| ExecutionError::Generic {
            message: format!("Failed to execute Things URL: {message}"),
            command: Some(command.to_string()),
        };
        timeout(limit, self.opener.open(url))
            .await
            .map_err(|_| failed(format!("timed out after {}ms", limit.as_millis())))?
            .map_err(|e| failed(e.to_string()))
    }

    /// Run a flat-mode command.
    pub async fn run_url(&self, command: &str, params: &CommandParameters) -> Result<()> {
        let url = self.build_url(command, params)?;
        self.open(command, &url, self.config.open_timeout).await
    }

    /// Run a JSON-mode command.
    pub async fn run_json(&self, items: &[JsonItem]) -> Result<()> {
        let url = self.build_json_url(items)?;
        self.open(JSON_COMMAND, &url, self.config.json_open_timeout)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::payload::{ProjectItem, ProjectTodo, append_to_project};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TOKEN: &str = "tok_1234567890";

    #[derive(Default)]
    struct SpyOpener {
        calls: AtomicUsize,
        urls: Mutex<Vec<String>>,
        fail: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl UrlOpener for SpyOpener {
        async fn open(&self, url: &str) -> std::io::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(std::io::Error::other("no handler for things"));
            }
            Ok(())
        }
    }

    fn executor(token: Option<&str>, spy: Arc<SpyOpener>) -> UrlExecutor {
        UrlExecutor::new(UrlExecutorConfig::default(), AuthGate::fixed(token), spy)
    }

    fn query_of(url: &str) -> Vec<(String, String)> {
        url::Url::parse(url)
            .unwrap()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn flat_params_round_trip_through_query_string() {
        let spy = Arc::new(SpyOpener::default());
        let params = CommandParameters::new()
            .with("title", "Buy milk & eggs")
            .with("when", "today")
            .with("list_id", "ABC")
            .with("completed", false)
            .with("tags", vec!["errand".to_string(), "home".to_string()])
            .with("checklist_items", vec!["2%".to_string(), "oat".to_string()])
            .with("todos", Vec::<String>::new());

        let url = executor(None, spy).build_url("add", &params).unwrap();
        assert!(url.starts_with("things:///add?"));

        let query: HashMap<_, _> = query_of(&url).into_iter().collect();
        assert_eq!(query["title"], "Buy milk & eggs");
        assert_eq!(query["when"], "today");
        assert_eq!(query["list-id"], "ABC");
        assert_eq!(query["completed"], "false");
        assert_eq!(query["tags"], "errand,home");
        assert_eq!(query["checklist-items"], "2%\noat");
        assert!(!query.contains_key("to-dos"));
    }

    #[test]
    fn scalars_are_stripped_of_controls_and_component_encoded() {
        let spy = Arc::new(SpyOpener::default());
        let params = CommandParameters::new().with("query", "a\u{0}b c+d");
        let url = executor(None, spy).build_url("search", &params).unwrap();
        assert_eq!(url, "things:///search?query=ab%20c%2Bd");
    }

    #[test]
    fn empty_strings_are_kept() {
        let spy = Arc::new(SpyOpener::default());
        let params = CommandParameters::new().with("deadline", "");
        let url = executor(None, spy).build_url("update-project", &CommandParameters::new());
        assert_eq!(url.unwrap_err().kind(), ErrorKind::AuthRequired);

        let url = executor(Some(TOKEN), Arc::new(SpyOpener::default()))
            .build_url("update", &params)
            .unwrap();
        assert!(url.ends_with("&deadline="));
    }

    #[test]
    fn auth_token_comes_first_for_update_commands() {
        let spy = Arc::new(SpyOpener::default());
        let params = CommandParameters::new().with("id", "X").with("title", "T");
        let url = executor(Some(TOKEN), spy).build_url("update", &params).unwrap();
        let query = query_of(&url);
        assert_eq!(query[0], ("auth-token".to_string(), TOKEN.to_string()));
        assert_eq!(query[1].0, "id");
    }

    #[test]
    fn non_update_commands_do_not_need_a_token() {
        let spy = Arc::new(SpyOpener::default());
        let url = executor(None, spy)
            .build_url("show", &CommandParameters::new().with("id", "today"))
            .unwrap();
        assert!(!url.contains("auth-token"));
    }

    #[tokio::test]
    async fn missing_token_never_reaches_the_opener() {
        let spy = Arc::new(SpyOpener::default());
        let err = executor(None, spy.clone())
            .run_url("update", &CommandParameters::new().with("id", "X"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthRequired);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn overlong_url_is_rejected_before_opening() {
        let spy = Arc::new(SpyOpener::default());
        let params = CommandParameters::new().with("notes", "n".repeat(MAX_URL_LENGTH));
        let err = executor(None, spy.clone())
            .run_url("add", &params)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UrlTooLong);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn opener_failure_is_generic_with_command() {
        let spy = Arc::new(SpyOpener {
            fail: true,
            ..SpyOpener::default()
        });
        let err = executor(None, spy)
            .run_url("show", &CommandParameters::new().with("id", "today"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert!(err.to_string().starts_with("Failed to execute Things URL"));
        assert_eq!(err.details()["command"], "show");
    }

    #[tokio::test]
    async fn slow_opener_times_out_as_generic() {
        let spy = Arc::new(SpyOpener {
            delay: Some(Duration::from_millis(200)),
            ..SpyOpener::default()
        });
        let config = UrlExecutorConfig {
            open_timeout: Duration::from_millis(20),
            ..UrlExecutorConfig::default()
        };
        let executor = UrlExecutor::new(config, AuthGate::fixed(None), spy);
        let err = executor
            .run_url("search", &CommandParameters::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn json_mode_encodes_items_into_data() {
        let spy = Arc::new(SpyOpener::default());
        let item = JsonItem {
            kind: "to-do".into(),
            operation: None,
            id: None,
            attributes: serde_json::json!({ "title": "Ship it", "tags": ["a"] })
                .as_object()
                .unwrap()
                .clone(),
        };
        executor(None, spy.clone())
            .run_json(&[item])
            .await
            .unwrap();

        let urls = spy.urls.lock().unwrap();
        assert!(urls[0].starts_with("things:///json?data="));
        let query = query_of(&urls[0]);
        let data: serde_json::Value = serde_json::from_str(&query[0].1).unwrap();
        assert_eq!(
            data,
            serde_json::json!([{ "type": "to-do", "attributes": { "title": "Ship it", "tags": ["a"] } }])
        );
    }

    #[tokio::test]
    async fn json_update_requires_token_at_top_level() {
        let items = [append_to_project(
            "P-1",
            &[ProjectItem::Todo(ProjectTodo {
                title: "Next".into(),
                ..ProjectTodo::default()
            })],
        )];

        let spy = Arc::new(SpyOpener::default());
        let err = executor(None, spy.clone()).run_json(&items).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthRequired);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);

        let url = executor(Some(TOKEN), spy).build_json_url(&items).unwrap();
        let query = query_of(&url);
        assert_eq!(query[0].0, "auth-token");
        assert_eq!(query[1].0, "data");
        assert!(!query[1].1.contains(TOKEN));
    }

    #[tokio::test]
    async fn oversized_json_payload_is_rejected_before_opening() {
        let spy = Arc::new(SpyOpener::default());
        let item = JsonItem {
            kind: "to-do".into(),
            operation: None,
            id: None,
            attributes: serde_json::json!({ "title": "x".repeat(MAX_JSON_URL_LENGTH) })
                .as_object()
                .unwrap()
                .clone(),
        };
        let err = executor(None, spy.clone())
            .run_json(&[item])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PayloadTooLarge);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);
    }
}
