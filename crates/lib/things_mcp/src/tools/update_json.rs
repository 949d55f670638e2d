//! Structured update tools (JSON mode, token required).

use async_trait::async_trait;
use serde::Deserialize;

use things_core::payload::{ProjectItem, append_to_project, item_count};
use things_core::sanitize::sanitize_for_url;
use things_core::schema::{Field, Schema, ValidatedArgs};
use things_core::{ExecutionError, Result};

use super::ToolContext;
use super::schemas;
use crate::handler::{ToolDescriptor, ToolHandler};

#[derive(Debug, Deserialize)]
struct AddItemsParams {
    project_id: String,
    items: Vec<ProjectItem>,
}

pub struct UpdateJsonTools {
    ctx: ToolContext,
    tools: Vec<ToolDescriptor>,
}

impl UpdateJsonTools {
    pub fn new(ctx: ToolContext) -> Self {
        let schema = Schema::object(vec![
            Field::required(
                "project_id",
                Schema::string()
                    .min_len(1, "Project ID is required")
                    .describe("ID of the project to add items to"),
            ),
            Field::required(
                "items",
                schemas::project_items().min_items(1, "At least one item is required"),
            ),
        ]);

        Self {
            ctx,
            tools: vec![ToolDescriptor::new(
                "things_add_items_to_project",
                "Add to-dos and headings to an existing project. Items are a flat ordered list; a heading groups the to-dos that follow it.",
                schema,
            )],
        }
    }
}

#[async_trait]
impl ToolHandler for UpdateJsonTools {
    fn definitions(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, args: ValidatedArgs) -> Result<String> {
        if tool != "things_add_items_to_project" {
            return Err(ExecutionError::UnknownTool(tool.to_string()));
        }

        let params: AddItemsParams = args.parse()?;
        let project_id = sanitize_for_url(&params.project_id);
        let record = append_to_project(&project_id, &params.items);
        self.ctx.urls.run_json(&[record]).await?;

        Ok(format!(
            "✅ Added {} items to project {project_id}",
            item_count(&params.items)
        ))
    }
}
