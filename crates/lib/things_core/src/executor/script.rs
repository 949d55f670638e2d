//! Script executor.
//!
//! Runs a named script file from the scripts directory through the configured
//! runner (`osascript` by default). Arguments are passed as separate argv
//! entries after sanitising; no shell is involved.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::{ExecutionError, Result};
use crate::sanitize::sanitize_for_transport_arg;

/// Default per-script timeout.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the application availability probe.
pub const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);

const AVAILABILITY_SCRIPT: &str =
    r#"tell application "System Events" to name of application processes"#;

/// Configuration for [`ScriptExecutor`].
#[derive(Clone, Debug)]
pub struct ScriptExecutorConfig {
    /// Script runner executable.
    pub program: String,
    /// Directory holding `<name>.<extension>` scripts.
    pub scripts_dir: PathBuf,
    pub extension: String,
    /// Process name looked for by the availability probe.
    pub app_process_name: String,
    pub timeout: Duration,
}

impl Default for ScriptExecutorConfig {
    fn default() -> Self {
        Self {
            program: "osascript".into(),
            scripts_dir: PathBuf::from("scripts"),
            extension: "applescript".into(),
            app_process_name: "Things3".into(),
            timeout: SCRIPT_TIMEOUT,
        }
    }
}

/// Per-call options.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunOptions {
    /// Overrides the configured timeout.
    pub timeout: Option<Duration>,
    /// Appended as the final script argument.
    pub max_results: Option<u32>,
}

impl RunOptions {
    pub fn max_results(max_results: Option<u32>) -> Self {
        Self {
            max_results,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScriptExecutor {
    config: ScriptExecutorConfig,
}

impl ScriptExecutor {
    pub fn new(config: ScriptExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScriptExecutorConfig {
        &self.config
    }

    fn script_path(&self, script: &str) -> PathBuf {
        self.config
            .scripts_dir
            .join(format!("{script}.{}", self.config.extension))
    }

    /// Run `script` with `args` and return its trimmed stdout.
    pub async fn run(&self, script: &str, args: &[&str], options: RunOptions) -> Result<String> {
        let path = self.script_path(script);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ExecutionError::NotFound {
                resource: path.display().to_string(),
            });
        }

        let mut argv = Vec::with_capacity(args.len() + 2);
        argv.push(path.display().to_string());
        for (i, arg) in args.iter().enumerate() {
            argv.push(sanitize_for_transport_arg(arg, &format!("argument[{i}]"))?.to_string());
        }
        if let Some(max) = options.max_results {
            argv.push(max.to_string());
        }

        let limit = options.timeout.unwrap_or(self.config.timeout);
        debug!(
            script,
            command = %format!("{} {}", self.config.program, shell_words::join(&argv)),
            "Running script"
        );

        let started = Instant::now();
        let output = timeout(
            limit,
            Command::new(&self.config.program)
                .args(&argv)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ExecutionError::Timeout {
            operation: script.to_string(),
            duration: limit,
        })?
        .map_err(|e| ExecutionError::ScriptFailure {
            script: script.to_string(),
            detail: e.to_string(),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            script,
            elapsed_ms = started.elapsed().as_millis() as u64,
            status = %output.status,
            "Script finished"
        );

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            return Err(ExecutionError::ScriptFailure {
                script: script.to_string(),
                detail: detail.to_string(),
            });
        }

        if !stderr.trim().is_empty() {
            warn!(script, stderr = %stderr.trim(), "Script wrote to stderr");
        }

        Ok(stdout.trim().to_string())
    }

    /// Whether the Things process is running. Any failure counts as `false`.
    pub async fn test_availability(&self) -> bool {
        let probe = Command::new(&self.config.program)
            .args(["-e", AVAILABILITY_SCRIPT])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match timeout(AVAILABILITY_TIMEOUT, probe).await {
            Ok(Ok(output)) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).contains(&self.config.app_process_name)
            }
            Ok(Ok(_)) => false,
            Ok(Err(e)) => {
                debug!("Availability probe failed: {e}");
                false
            }
            Err(_) => {
                debug!("Availability probe timed out after {AVAILABILITY_TIMEOUT:?}");
                false
            }
        }
    }
}
