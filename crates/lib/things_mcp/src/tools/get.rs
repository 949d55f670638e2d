//! Read tools: run a script and parse its line output.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use things_core::executor::RunOptions;
use things_core::parser::{
    parse_area_list, parse_project_list, parse_tag_list, parse_todo_details, parse_todo_list,
};
use things_core::schema::{Field, Schema, ValidatedArgs};
use things_core::{ExecutionError, Result};

use super::ToolContext;
use super::schemas::{self, LISTS};
use crate::handler::{ToolDescriptor, ToolHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Todos,
    Projects,
    Areas,
    Tags,
    Details,
}

impl Output {
    fn key(self) -> &'static str {
        match self {
            Output::Todos | Output::Details => "todos",
            Output::Projects => "projects",
            Output::Areas => "areas",
            Output::Tags => "tags",
        }
    }
}

/// Where a get tool takes its script name and positional argument from.
#[derive(Debug, Clone, Copy)]
enum Source {
    Script(&'static str),
    /// Script chosen by the `list` argument: `get-<list>`.
    NamedList,
}

struct GetTool {
    name: &'static str,
    description: &'static str,
    source: Source,
    output: Output,
    /// Required identifier argument passed to the script.
    id_field: Option<(&'static str, &'static str)>,
}

const GET_TOOLS: &[GetTool] = &[
    GetTool {
        name: "things_get_inbox",
        description: "Get all to-dos in the Inbox",
        source: Source::Script("get-inbox"),
        output: Output::Todos,
        id_field: None,
    },
    GetTool {
        name: "things_get_today",
        description: "Get all to-dos scheduled for Today",
        source: Source::Script("get-today"),
        output: Output::Todos,
        id_field: None,
    },
    GetTool {
        name: "things_get_upcoming",
        description: "Get all scheduled to-dos (with dates)",
        source: Source::Script("get-upcoming"),
        output: Output::Todos,
        id_field: None,
    },
    GetTool {
        name: "things_get_anytime",
        description: "Get all to-dos in Anytime",
        source: Source::Script("get-anytime"),
        output: Output::Todos,
        id_field: None,
    },
    GetTool {
        name: "things_get_someday",
        description: "Get all to-dos in Someday",
        source: Source::Script("get-someday"),
        output: Output::Todos,
        id_field: None,
    },
    GetTool {
        name: "things_get_logbook",
        description: "Get completed to-dos from the Logbook",
        source: Source::Script("get-logbook"),
        output: Output::Todos,
        id_field: None,
    },
    GetTool {
        name: "things_get_projects",
        description: "Get all active projects",
        source: Source::Script("get-projects"),
        output: Output::Projects,
        id_field: None,
    },
    GetTool {
        name: "things_get_areas",
        description: "Get all areas",
        source: Source::Script("get-areas"),
        output: Output::Areas,
        id_field: None,
    },
    GetTool {
        name: "things_get_tags",
        description: "Get all tags",
        source: Source::Script("get-tags"),
        output: Output::Tags,
        id_field: None,
    },
    GetTool {
        name: "things_get_project",
        description: "Get all to-dos in a specific project",
        source: Source::Script("get-project-todos"),
        output: Output::Todos,
        id_field: Some(("project_id", "Project ID is required")),
    },
    GetTool {
        name: "things_get_area",
        description: "Get all items in a specific area",
        source: Source::Script("get-area-items"),
        output: Output::Todos,
        id_field: Some(("area_id", "Area ID is required")),
    },
    GetTool {
        name: "things_get_list",
        description: "Get all to-dos in a list by name",
        source: Source::NamedList,
        output: Output::Todos,
        id_field: None,
    },
    GetTool {
        name: "things_get_todo_details",
        description: "Get detailed information about a specific to-do",
        source: Source::Script("get-todo-details"),
        output: Output::Details,
        id_field: Some(("id", "Todo ID is required")),
    },
];

impl GetTool {
    fn schema(&self) -> Schema {
        let mut fields = Vec::new();
        if let Some((field, message)) = self.id_field {
            fields.push(Field::required(field, Schema::string().min_len(1, message)));
        }
        if matches!(self.source, Source::NamedList) {
            fields.push(Field::required(
                "list",
                Schema::enumeration(LISTS).describe("Name of the list"),
            ));
        }
        if self.output != Output::Details {
            fields.push(schemas::max_results());
        }
        Schema::object(fields)
    }

    fn script(&self, args: &ValidatedArgs) -> Result<String> {
        match self.source {
            Source::Script(script) => Ok(script.to_string()),
            Source::NamedList => args
                .get_str("list")
                .map(|list| format!("get-{list}"))
                .ok_or_else(|| ExecutionError::validation("list", "Required")),
        }
    }
}

fn format_error(e: serde_json::Error) -> ExecutionError {
    ExecutionError::generic(format!("Failed to format result: {e}"))
}

/// `{"<key>": records}`, pretty-printed.
fn pretty<T: Serialize>(key: &str, records: T) -> Result<String> {
    let mut body = Map::new();
    body.insert(key.to_string(), serde_json::to_value(records).map_err(format_error)?);
    serde_json::to_string_pretty(&Value::Object(body)).map_err(format_error)
}

pub struct GetTools {
    ctx: ToolContext,
    tools: Vec<ToolDescriptor>,
}

impl GetTools {
    pub fn new(ctx: ToolContext) -> Self {
        let tools = GET_TOOLS
            .iter()
            .map(|t| ToolDescriptor::new(t.name, t.description, t.schema()))
            .collect();
        Self { ctx, tools }
    }
}

#[async_trait]
impl ToolHandler for GetTools {
    fn definitions(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    async fn execute(&self, tool: &str, args: ValidatedArgs) -> Result<String> {
        let entry = GET_TOOLS
            .iter()
            .find(|t| t.name == tool)
            .ok_or_else(|| ExecutionError::UnknownTool(tool.to_string()))?;

        let script = entry.script(&args)?;
        let script_args: Vec<&str> = entry
            .id_field
            .and_then(|(field, _)| args.get_str(field))
            .into_iter()
            .collect();
        let max_results = args
            .get("max_results")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());

        let output = self
            .ctx
            .scripts
            .run(&script, &script_args, RunOptions::max_results(max_results))
            .await?;

        let options = self.ctx.parse;
        if entry.output == Output::Details {
            let details = parse_todo_details(&output, options)?;
            return serde_json::to_string_pretty(&details).map_err(format_error);
        }

        if output.trim().is_empty() {
            return pretty(entry.output.key(), Vec::<Value>::new());
        }

        match entry.output {
            Output::Projects => pretty("projects", parse_project_list(&output, options)?),
            Output::Areas => pretty("areas", parse_area_list(&output, options)?),
            Output::Tags => pretty("tags", parse_tag_list(&output, options)?),
            Output::Todos | Output::Details => pretty("todos", parse_todo_list(&output, options)?),
        }
    }
}
