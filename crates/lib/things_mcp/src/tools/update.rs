//! Update tools (flat URL mode, token required).

use async_trait::async_trait;

use things_core::params::CommandParameters;
use things_core::schema::{Field, Schema, ValidatedArgs};
use things_core::{ExecutionError, Result};

use super::ToolContext;
use super::schemas;
use crate::handler::{ToolDescriptor, ToolHandler};

fn optional_title() -> Field {
    Field::optional("title", schemas::title())
}

pub struct UpdateTools {
    ctx: ToolContext,
    tools: Vec<ToolDescriptor>,
}

impl UpdateTools {
    pub fn new(ctx: ToolContext) -> Self {
        let id = || {
            Field::required(
                "id",
                Schema::string()
                    .min_len(1, "ID is required")
                    .describe("ID of the item to update"),
            )
        };

        let todo = Schema::object(vec![
            id(),
            optional_title(),
            Field::optional("notes", schemas::notes()),
            Field::optional("when", schemas::when()),
            Field::optional("deadline", schemas::date()),
            Field::optional("tags", schemas::tags()),
            Field::optional(
                "checklist_items",
                Schema::array(schemas::short_text("Checklist item"))
                    .max_items(100, "Too many checklist items"),
            ),
            Field::optional("list_id", Schema::string()),
            Field::optional("list", schemas::short_text("List")),
            Field::optional("heading", schemas::short_text("Heading")),
            Field::optional("completed", Schema::boolean()),
            Field::optional("canceled", Schema::boolean()),
        ]);

        let project = Schema::object(vec![
            id(),
            optional_title(),
            Field::optional("notes", schemas::notes()),
            Field::optional("when", schemas::when()),
            Field::optional("deadline", schemas::date()),
            Field::optional("tags", schemas::tags()),
            Field::optional("area_id", Schema::string()),
            Field::optional("area", schemas::short_text("Area")),
            Field::optional("completed", Schema::boolean()),
            Field::optional("canceled", Schema::boolean()),
        ]);

        Self {
            ctx,
            tools: vec![
                ToolDescriptor::new("things_update_todo", "Update an existing to-do in Things", todo),
                ToolDescriptor::new(
                    "things_update_project",
                    "Update an existing project in Things",
                    project,
                ),
            ],
        }
    }
}

#[async_trait]
impl ToolHandler for UpdateTools {
    fn definitions(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, args: ValidatedArgs) -> Result<String> {
        let (command, noun) = match tool {
            "things_update_todo" => ("update", "To-do"),
            "things_update_project" => ("update-project", "Project"),
            other => return Err(ExecutionError::UnknownTool(other.to_string())),
        };

        let id = args.get_str("id").unwrap_or_default();

        let mut params = CommandParameters::new().with("id", id);
        params.extend_from_args(args.as_map(), &["id"]);
        self.ctx.urls.run_url(command, &params).await?;

        let label = match args.get_str("title") {
            Some(title) => title.to_string(),
            None => format!("ID {id}"),
        };
        Ok(format!("✅ {noun} updated successfully: {label}"))
    }
}
