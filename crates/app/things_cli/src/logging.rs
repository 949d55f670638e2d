use tracing_subscriber::EnvFilter;

use crate::Error;

const VERBOSE_FILTER: &str = "info,things_core=debug,things_mcp=debug";

/// Install the global subscriber. Logs go to stderr; stdout carries the
/// stdio transport.
pub fn init(verbose: bool) -> Result<(), Error> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) => EnvFilter::try_new(&directives)
            .map_err(|e| Error::Logging(format!("invalid RUST_LOG {directives:?}: {e}")))?,
        Err(_) if verbose => EnvFilter::new(VERBOSE_FILTER),
        Err(_) => EnvFilter::new("info"),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
