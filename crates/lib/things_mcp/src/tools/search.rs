//! Search tool (flat URL mode).

use async_trait::async_trait;

use things_core::params::CommandParameters;
use things_core::schema::{Field, Schema, ValidatedArgs};
use things_core::{ExecutionError, Result};

use super::ToolContext;
use crate::handler::{ToolDescriptor, ToolHandler};

pub struct SearchTools {
    ctx: ToolContext,
    tools: Vec<ToolDescriptor>,
}

impl SearchTools {
    pub fn new(ctx: ToolContext) -> Self {
        let schema = Schema::object(vec![Field::optional(
            "query",
            Schema::string()
                .max_len(255, "Query too long")
                .describe("Search query (leave empty to just open search)"),
        )]);
        Self {
            ctx,
            tools: vec![ToolDescriptor::new("things_search", "Search in Things", schema)],
        }
    }
}

#[async_trait]
impl ToolHandler for SearchTools {
    fn definitions(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, args: ValidatedArgs) -> Result<String> {
        if tool != "things_search" {
            return Err(ExecutionError::UnknownTool(tool.to_string()));
        }

        let query = args.get_str("query").filter(|q| !q.is_empty());
        let params = CommandParameters::new().with_opt("query", query);
        self.ctx.urls.run_url("search", &params).await?;

        Ok(match query {
            Some(query) => format!("🔍 Search opened with query: \"{query}\""),
            None => "🔍 Search opened in Things".to_string(),
        })
    }
}
