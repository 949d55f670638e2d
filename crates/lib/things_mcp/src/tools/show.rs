//! Navigation tool (flat URL mode).

use async_trait::async_trait;
use serde::Deserialize;

use things_core::params::CommandParameters;
use things_core::schema::{Field, Schema, ValidatedArgs};
use things_core::{ExecutionError, Result};

use super::ToolContext;
use crate::handler::{ToolDescriptor, ToolHandler};

#[derive(Debug, Deserialize)]
struct ShowParams {
    id: Option<String>,
    query: Option<String>,
    #[serde(default)]
    filter: Vec<String>,
}

pub struct ShowTools {
    ctx: ToolContext,
    tools: Vec<ToolDescriptor>,
}

impl ShowTools {
    pub fn new(ctx: ToolContext) -> Self {
        let schema = Schema::object(vec![
            Field::optional(
                "id",
                Schema::string().describe("ID of a specific to-do, project, or area"),
            ),
            Field::optional(
                "query",
                Schema::string().max_len(255, "Query too long").describe(
                    "Navigate to a list: inbox, today, anytime, upcoming, someday, logbook, trash",
                ),
            ),
            Field::optional(
                "filter",
                Schema::array(Schema::string()).describe("Filter by tags when showing a list"),
            ),
        ])
        .at_least_one_of(["id", "query"], "Either id or query must be provided");

        Self {
            ctx,
            tools: vec![ToolDescriptor::new(
                "things_show",
                "Navigate to a specific item or list in Things",
                schema,
            )],
        }
    }
}

#[async_trait]
impl ToolHandler for ShowTools {
    fn definitions(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, args: ValidatedArgs) -> Result<String> {
        if tool != "things_show" {
            return Err(ExecutionError::UnknownTool(tool.to_string()));
        }

        let params: ShowParams = args.parse()?;
        let command = CommandParameters::new()
            .with_opt("id", params.id.clone())
            .with_opt("query", params.query.clone())
            .with("filter", params.filter);
        self.ctx.urls.run_url("show", &command).await?;

        Ok(match (params.id, params.query) {
            (Some(id), _) if !id.is_empty() => "🔍 Navigated to item in Things".to_string(),
            (_, query) => format!("🔍 Navigated to: {}", query.unwrap_or_default()),
        })
    }
}
