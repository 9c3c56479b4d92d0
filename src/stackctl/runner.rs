//! Subprocess adapter for the `stackctl` CLI.
//!
//! All CLI interaction goes through the [`CommandRunner`] trait so the
//! rest of the crate can be exercised against a scripted runner. The real
//! implementation shells out with the auth token and color suppression in
//! the environment, captures standard output, and reports the exit code
//! without interpreting it. Error interpretation belongs to callers.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{Result, ToolError};

/// Name of the external CLI binary.
pub const STACKCTL_BIN: &str = "stackctl";

/// Environment variable carrying the platform auth token.
const TOKEN_ENV: &str = "STACKCTL_TOKEN";

/// Captured result of one CLI invocation.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code of the process; `-1` if it was killed by a signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
}

/// Runs the external CLI with a fixed environment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the CLI with the given arguments and captures its output.
    ///
    /// A non-zero exit code is NOT an error at this layer.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned or its
    /// output cannot be collected.
    async fn run(&self, args: &[String]) -> Result<CommandOutput>;
}

/// The real `stackctl` subprocess runner.
#[derive(Debug, Clone)]
pub struct StackctlRunner {
    /// Platform auth token injected into the subprocess environment.
    token: String,
    /// Path to the binary; defaults to [`STACKCTL_BIN`] on `PATH`.
    program: PathBuf,
}

impl StackctlRunner {
    /// Creates a runner using the `stackctl` binary on `PATH`.
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            program: PathBuf::from(STACKCTL_BIN),
        }
    }

    /// Sets an explicit path to the binary.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl CommandRunner for StackctlRunner {
    async fn run(&self, args: &[String]) -> Result<CommandOutput> {
        debug!("Running {} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .env(TOKEN_ENV, &self.token)
            .env("NO_COLOR", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| ToolError::spawn(format!("{}: {e}", self.program.display())))?;

        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        trace!("stackctl exited {exit_code}, {} bytes of output", stdout.len());

        Ok(CommandOutput { exit_code, stdout })
    }
}
