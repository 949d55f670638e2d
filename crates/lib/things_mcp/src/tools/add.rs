//! Creation tools (JSON mode).

use async_trait::async_trait;

use things_core::payload::{ProjectDraft, TodoDraft, item_count};
use things_core::schema::{Field, Schema, ValidatedArgs};
use things_core::{ExecutionError, Result};

use super::ToolContext;
use super::schemas;
use crate::handler::{ToolDescriptor, ToolHandler};

pub struct AddTools {
    ctx: ToolContext,
    tools: Vec<ToolDescriptor>,
}

impl AddTools {
    pub fn new(ctx: ToolContext) -> Self {
        let todo = Schema::object(vec![
            Field::required("title", schemas::title()),
            Field::optional("notes", schemas::notes()),
            Field::optional("when", schemas::when()),
            Field::optional("deadline", schemas::date()),
            Field::optional("tags", schemas::tags()),
            Field::optional(
                "checklist_items",
                Schema::array(schemas::short_text("Checklist item"))
                    .max_items(100, "Too many checklist items"),
            ),
            Field::optional("list_id", Schema::string().describe("ID of the project or area")),
            Field::optional("list", schemas::short_text("List")),
            Field::optional("heading", schemas::short_text("Heading")),
            Field::optional("completed", Schema::boolean()),
            Field::optional("canceled", Schema::boolean()),
        ]);

        let project = Schema::object(vec![
            Field::required("title", schemas::title()),
            Field::optional("notes", schemas::notes()),
            Field::optional("when", schemas::when()),
            Field::optional("deadline", schemas::date()),
            Field::optional("tags", schemas::tags()),
            Field::optional("area_id", Schema::string().describe("ID of the area")),
            Field::optional("area", schemas::short_text("Area")),
            Field::optional("items", schemas::project_items()),
            Field::optional("completed", Schema::boolean()),
            Field::optional("canceled", Schema::boolean()),
        ]);

        Self {
            ctx,
            tools: vec![
                ToolDescriptor::new("things_add_todo", "Create a new to-do in Things", todo),
                ToolDescriptor::new(
                    "things_add_project",
                    "Create a new project in Things, optionally with an ordered list of to-dos and headings",
                    project,
                ),
            ],
        }
    }
}

#[async_trait]
impl ToolHandler for AddTools {
    fn definitions(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, args: ValidatedArgs) -> Result<String> {
        match tool {
            "things_add_todo" => {
                let draft: TodoDraft = args.parse()?;
                self.ctx.urls.run_json(&[draft.to_item()]).await?;
                Ok(format!("✅ To-do created successfully: \"{}\"", draft.title))
            }
            "things_add_project" => {
                let draft: ProjectDraft = args.parse()?;
                self.ctx.urls.run_json(&[draft.to_item()]).await?;
                Ok(match item_count(&draft.items) {
                    0 => format!("✅ Project created successfully: \"{}\"", draft.title),
                    n => format!(
                        "✅ Project created successfully: \"{}\" ({n} items)",
                        draft.title
                    ),
                })
            }
            other => Err(ExecutionError::UnknownTool(other.to_string())),
        }
    }
}
