//! Tool handler abstraction.
//!
//! A handler owns one or more [`ToolDescriptor`]s and implements
//! [`ToolHandler::execute`] for them. [`ToolHandler::handle`] drives a call
//! through validation and execution and always produces a
//! [`ResponseEnvelope`].

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use rmcp::model::Tool;
use serde_json::Value;
use tracing::{debug, warn};

use things_core::schema::{Schema, ValidatedArgs};
use things_core::{ExecutionError, Result};

use crate::envelope::ResponseEnvelope;

/// Name, description and parameter schema of one tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub schema: Schema,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }

    /// Discovery schema for the tool's arguments.
    pub fn input_schema(&self) -> Value {
        self.schema.describe_json()
    }

    pub fn to_tool(&self) -> Tool {
        let schema = match self.input_schema() {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Tool::new(self.name.clone(), self.description.clone(), Arc::new(schema))
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Tools served by this handler.
    fn definitions(&self) -> &[ToolDescriptor];

    /// Run `tool` with validated arguments and return the result text.
    async fn execute(&self, tool: &str, args: ValidatedArgs) -> Result<String>;

    fn describe(&self, tool: &str) -> Option<&ToolDescriptor> {
        self.definitions().iter().find(|d| d.name == tool)
    }

    /// Validate, execute and wrap. Never fails.
    async fn handle(&self, tool: &str, raw: &Value) -> ResponseEnvelope {
        let Some(descriptor) = self.describe(tool) else {
            return ResponseEnvelope::from_error(&ExecutionError::UnknownTool(tool.to_string()));
        };

        let args = match descriptor.schema.validate(raw) {
            Ok(args) => args,
            Err(err) => {
                debug!(tool, error = %err, "Rejected tool arguments");
                return ResponseEnvelope::from_error(&err);
            }
        };

        let started = Instant::now();
        match self.execute(tool, args).await {
            Ok(text) => {
                debug!(
                    tool,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Tool call succeeded"
                );
                ResponseEnvelope::success(text)
            }
            Err(err) => {
                warn!(
                    tool,
                    kind = %err.kind(),
                    details = %err.details(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Tool call failed: {err}"
                );
                ResponseEnvelope::from_error(&err)
            }
        }
    }
}
