//! `things-mcp`: MCP server for the Things task manager.
//!
//! Runs over stdio by default; `serve --transport http` mounts the same tools
//! at `/mcp` on an axum listener.

// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use clap::Parser;
use cli::{Cli, Commands, ServeArgs};
use serde_json::json;

use things_mcp::build_registry;

mod cli;
mod config;
mod logging;
mod serve;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        report(&e);
        std::process::exit(1);
    }
}

/// Errors raised before the subscriber is installed go straight to stderr.
fn report(err: &Error) {
    if tracing::dispatcher::has_been_set() {
        tracing::error!("{}", err);
    } else {
        eprintln!("things-mcp: {err}");
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    logging::init(args.verbose)?;

    match args.command {
        None => serve::run(args.things.tool_context(), &ServeArgs::default()).await?,
        Some(Commands::Serve(serve_args)) => {
            serve::run(args.things.tool_context(), &serve_args).await?
        }
        Some(Commands::Tools) => {
            let registry = build_registry(&args.things.tool_context());
            let tools: Vec<_> = registry
                .list_all()
                .into_iter()
                .map(|d| {
                    json!({
                        "name": d.name,
                        "description": d.description,
                        "inputSchema": d.input_schema(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&tools)?);
        }
        Some(Commands::Check) => {
            let ctx = args.things.tool_context();
            if !ctx.scripts.test_availability().await {
                return Err(Error::Custom(
                    "Things 3 is not running. Please open Things 3 and try again.".into(),
                ));
            }
            println!("Things 3 is running");
        }
        Some(Commands::Version) => {
            println!("things-mcp {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
