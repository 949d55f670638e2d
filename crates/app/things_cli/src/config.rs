//! Executor configuration from command-line flags.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use things_core::auth::AuthGate;
use things_core::executor::{
    ScriptExecutor, ScriptExecutorConfig, SystemOpener, UrlExecutor, UrlExecutorConfig,
};
use things_mcp::ToolContext;

use crate::cli::ThingsArgs;

const SCRIPTS_DIR: &str = "scripts";

/// The bundled `scripts` directory for an executable at `exe`: beside it for
/// an installed binary, one level up for a `bin/` layout.
fn bundled_scripts_dir(exe: &Path) -> Option<PathBuf> {
    exe.parent()?
        .ancestors()
        .take(2)
        .map(|dir| dir.join(SCRIPTS_DIR))
        .find(|dir| dir.is_dir())
}

fn default_scripts_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| bundled_scripts_dir(&exe))
        .unwrap_or_else(|| PathBuf::from(SCRIPTS_DIR))
}

impl ThingsArgs {
    pub fn scripts_dir(&self) -> PathBuf {
        self.scripts_dir.clone().unwrap_or_else(default_scripts_dir)
    }

    pub fn script_config(&self) -> ScriptExecutorConfig {
        ScriptExecutorConfig {
            program: self.script_runner.clone(),
            scripts_dir: self.scripts_dir(),
            ..ScriptExecutorConfig::default()
        }
    }

    pub fn url_config(&self) -> UrlExecutorConfig {
        UrlExecutorConfig {
            scheme: self.url_scheme.clone(),
            ..UrlExecutorConfig::default()
        }
    }

    /// Executors wired to the real system: the script runner and the
    /// platform URL opener. The token is read from `token_var` on each call.
    pub fn tool_context(&self) -> ToolContext {
        let scripts = ScriptExecutor::new(self.script_config());
        let urls = UrlExecutor::new(
            self.url_config(),
            AuthGate::from_env(self.token_var.clone()),
            Arc::new(SystemOpener),
        );
        ToolContext::new(scripts, urls)
    }
}
