//! Concrete Things tools.
//!
//! | Handler | Tools | Path |
//! |---|---|---|
//! | [`add::AddTools`] | `things_add_todo`, `things_add_project` | JSON URL |
//! | [`get::GetTools`] | `things_get_*` | script + parser |
//! | [`show::ShowTools`] | `things_show` | flat URL |
//! | [`search::SearchTools`] | `things_search` | flat URL |
//! | [`update::UpdateTools`] | `things_update_todo`, `things_update_project` | flat URL, token |
//! | [`update_json::UpdateJsonTools`] | `things_add_items_to_project` | JSON URL, token |

pub mod add;
pub mod get;
pub mod schemas;
pub mod search;
pub mod show;
pub mod update;
pub mod update_json;

use std::sync::Arc;

use things_core::executor::{ScriptExecutor, UrlExecutor};
use things_core::parser::ParseOptions;

use crate::handler::ToolHandler;

/// Executors shared by every tool handler.
#[derive(Clone)]
pub struct ToolContext {
    pub scripts: Arc<ScriptExecutor>,
    pub urls: Arc<UrlExecutor>,
    pub parse: ParseOptions,
}

impl ToolContext {
    pub fn new(scripts: ScriptExecutor, urls: UrlExecutor) -> Self {
        Self {
            scripts: Arc::new(scripts),
            urls: Arc::new(urls),
            parse: ParseOptions::default(),
        }
    }
}

/// Every handler, in registration order.
pub fn handlers(ctx: &ToolContext) -> Vec<Arc<dyn ToolHandler>> {
    vec![
        Arc::new(add::AddTools::new(ctx.clone())),
        Arc::new(get::GetTools::new(ctx.clone())),
        Arc::new(show::ShowTools::new(ctx.clone())),
        Arc::new(search::SearchTools::new(ctx.clone())),
        Arc::new(update::UpdateTools::new(ctx.clone())),
        Arc::new(update_json::UpdateJsonTools::new(ctx.clone())),
    ]
}
