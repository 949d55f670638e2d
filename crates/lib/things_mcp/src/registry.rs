//! Tool registry: name lookup across handlers.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, warn};

use things_core::ExecutionError;

use crate::envelope::ResponseEnvelope;
use crate::handler::{ToolDescriptor, ToolHandler};

/// Handlers in registration order, indexed by tool name.
///
/// When two handlers declare the same tool name the later registration wins
/// for both listing and dispatch.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) -> &mut Self {
        let slot = self.handlers.len();
        for descriptor in handler.definitions() {
            if self.index.insert(descriptor.name.clone(), slot).is_some() {
                warn!(tool = %descriptor.name, "Tool registered twice; later registration wins");
            }
        }
        self.handlers.push(handler);
        self
    }

    /// Every reachable tool, in handler registration order.
    pub fn list_all(&self) -> Vec<&ToolDescriptor> {
        self.handlers
            .iter()
            .enumerate()
            .flat_map(|(slot, handler)| {
                handler
                    .definitions()
                    .iter()
                    .filter(move |d| self.index.get(&d.name) == Some(&slot))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Route a call to the owning handler. Unknown names and panicking
    /// handlers produce error envelopes.
    ///
    /// Each call runs on its own task, so this must be awaited inside a Tokio
    /// runtime.
    pub async fn dispatch(&self, tool: &str, raw: &Value) -> ResponseEnvelope {
        let Some(handler) = self.index.get(tool).and_then(|&slot| self.handlers.get(slot)) else {
            warn!(tool, "Call to unknown tool");
            return ResponseEnvelope::from_error(&ExecutionError::UnknownTool(tool.to_string()));
        };

        let handler = Arc::clone(handler);
        let name = tool.to_string();
        let raw = raw.clone();
        match tokio::spawn(async move { handler.handle(&name, &raw).await }).await {
            Ok(envelope) => envelope,
            Err(e) => {
                error!(tool, error = %e, "Tool call aborted");
                ResponseEnvelope::from_error(&ExecutionError::generic(format!(
                    "Unexpected error while running {tool}"
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use things_core::schema::{Field, Schema, ValidatedArgs};

    struct Echo {
        label: &'static str,
        tools: Vec<ToolDescriptor>,
    }

    impl Echo {
        fn new(label: &'static str, names: &[&str]) -> Arc<Self> {
            let tools = names
                .iter()
                .map(|n| {
                    ToolDescriptor::new(
                        *n,
                        "echo",
                        Schema::object(vec![Field::required(
                            "text",
                            Schema::string().min_len(1, "Text is required"),
                        )]),
                    )
                })
                .collect();
            Arc::new(Self { label, tools })
        }
    }

    #[async_trait]
    impl ToolHandler for Echo {
        fn definitions(&self) -> &[ToolDescriptor] {
            &self.tools
        }

        async fn execute(&self, tool: &str, args: ValidatedArgs) -> things_core::Result<String> {
            match args.get_str("text") {
                Some("boom") => Err(ExecutionError::generic("exploded")),
                Some("panic") => panic!("handler bug"),
                Some(text) => Ok(format!("{}:{tool}:{text}", self.label)),
                None => Err(ExecutionError::generic("missing")),
            }
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(Echo::new("a", &["alpha", "shared"]))
            .register(Echo::new("b", &["beta", "shared"]));
        registry
    }

    #[test]
    fn lists_in_registration_order_without_shadowed_duplicates() {
        let registry = registry();
        let names: Vec<_> = registry.list_all().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "shared"]);
        assert_eq!(registry.len(), 3);
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let envelope = registry()
            .dispatch("shared", &serde_json::json!({ "text": "hi" }))
            .await;
        assert!(!envelope.is_error);
        assert_eq!(envelope.text(), "b:shared:hi");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_envelope() {
        let envelope = registry().dispatch("", &Value::Null).await;
        assert!(envelope.is_error);
        assert_eq!(envelope.text(), "Unknown tool: ");
    }

    #[tokio::test]
    async fn validation_failure_never_executes() {
        let envelope = registry()
            .dispatch("alpha", &serde_json::json!({ "text": "" }))
            .await;
        assert!(envelope.is_error);
        assert_eq!(envelope.text(), "Invalid parameters: text: Text is required");
    }

    #[tokio::test]
    async fn execution_errors_become_error_envelopes() {
        let envelope = registry()
            .dispatch("alpha", &serde_json::json!({ "text": "boom" }))
            .await;
        assert!(envelope.is_error);
        assert_eq!(envelope.text(), "exploded");
    }

    #[tokio::test]
    async fn panicking_handler_becomes_error_envelope() {
        let envelope = registry()
            .dispatch("beta", &serde_json::json!({ "text": "panic" }))
            .await;
        assert!(envelope.is_error);
        assert_eq!(envelope.text(), "Unexpected error while running beta");
    }
}
