use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use things_core::auth::DEFAULT_TOKEN_VAR;

#[derive(Parser, Debug)]
#[command(name = "things-mcp", about = "MCP server for the Things task manager")]
pub struct Cli {
    #[command(flatten)]
    pub things: ThingsArgs,

    /// Log at debug level for the Things crates (overridden by `RUST_LOG`).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Defaults to `serve` over stdio.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// How the server reaches Things.
#[derive(Args, Debug, Clone)]
pub struct ThingsArgs {
    /// Directory holding the read scripts. Defaults to a `scripts` directory
    /// next to the executable, or one level above it.
    #[arg(long, global = true, env = "THINGS_SCRIPTS_DIR")]
    pub scripts_dir: Option<PathBuf>,

    /// Program that runs a script file.
    #[arg(long, global = true, env = "THINGS_SCRIPT_RUNNER", default_value = "osascript")]
    pub script_runner: String,

    /// URL scheme registered by Things.
    #[arg(long, global = true, env = "THINGS_URL_SCHEME", default_value = "things")]
    pub url_scheme: String,

    /// Name of the environment variable holding the Things auth token.
    #[arg(long, global = true, default_value = DEFAULT_TOKEN_VAR)]
    pub token_var: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the MCP tools.
    Serve(ServeArgs),
    /// Print every tool with its input schema as JSON.
    Tools,
    /// Check whether Things is running.
    Check,
    /// Print the version.
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = "THINGS_MCP_BIND", default_value = "127.0.0.1:3333")]
    pub bind: String,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            transport: Transport::Stdio,
            bind: "127.0.0.1:3333".into(),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Http,
}
