//! Create/update execution for an environment.
//!
//! Chooses the verb from the existence probe, drives the plan pipeline,
//! and applies the resulting manifest through the CLI.

use semver::Version;
use tracing::info;

use crate::config::{ServiceOverrides, Settings};
use crate::error::{Result, ToolError};
use crate::plan::{PlanFetcher, PlanReconciler};

use super::probe::env_exists;
use super::runner::CommandRunner;

/// Restore-screen control sequence emitted by the CLI's full-screen UI.
/// Only the text after its last occurrence is meaningful.
const RESTORE_SCREEN: &str = "\u{1b}[?1049l";

/// First CLI version that understands the `--creator` flag.
const CREATOR_MIN_VERSION: Version = Version::new(0, 10, 0);

/// The verb applied to the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// The environment did not exist and is being created.
    Create,
    /// The environment exists and is being updated.
    Update,
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// Result of a successful create or update.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The verb that was applied.
    pub verb: Verb,
    /// Sanitized tail of the CLI output.
    pub output: String,
}

/// Applies the reconciled manifest to the environment.
pub struct EnvironmentExecutor<'a, R: CommandRunner> {
    /// CLI runner.
    runner: &'a R,
    /// Run settings.
    settings: &'a Settings,
    /// Run identifier forwarded to the reconciler.
    run_id: &'a str,
}

impl<'a, R: CommandRunner> EnvironmentExecutor<'a, R> {
    /// Creates a new executor.
    #[must_use]
    pub const fn new(runner: &'a R, settings: &'a Settings, run_id: &'a str) -> Self {
        Self {
            runner,
            settings,
            run_id,
        }
    }

    /// Creates or updates the environment from the services specification.
    ///
    /// # Errors
    ///
    /// Returns an error if the override grammar is invalid, the plan
    /// cannot be fetched or reconciled, or the CLI exits non-zero.
    pub async fn create_or_update(&self) -> Result<ApplyOutcome> {
        let overrides = ServiceOverrides::parse(&self.settings.services)?;

        let env_name = self.settings.env_name.as_str();
        let exists = env_exists(self.runner, env_name).await;

        let fetcher = PlanFetcher::new(self.runner);
        let plan = fetcher
            .fetch(exists, env_name, &self.settings.services)
            .await?;

        let reconciler = PlanReconciler::new(&overrides, self.run_id);
        let manifest = reconciler.reconcile(plan)?;

        let verb = if exists { Verb::Update } else { Verb::Create };
        let mut args: Vec<String> = vec![
            String::from("env"),
            verb.to_string(),
            String::from("-d"),
            String::from("full"),
            String::from("-f"),
            manifest.display().to_string(),
        ];
        if verb == Verb::Create
            && let Some(creator) = self.settings.creator.as_deref()
            && supports_creator(&self.settings.cli_version)
        {
            args.push(String::from("--creator"));
            args.push(creator.to_string());
        }
        args.push(env_name.to_string());

        let output = self.runner.run(&args).await?;
        let sanitized = sanitize_output(&output.stdout);

        if output.exit_code != 0 {
            return Err(ToolError::CommandFailed {
                verb: verb.to_string(),
                exit_code: output.exit_code,
                args,
                output: output.stdout,
            }
            .into());
        }

        info!("{verb} output:\n{sanitized}");
        Ok(ApplyOutcome {
            verb,
            output: sanitized.to_string(),
        })
    }
}

/// Strips full-screen UI noise, keeping only the text after the last
/// restore-screen sequence.
#[must_use]
pub fn sanitize_output(stdout: &str) -> &str {
    stdout.rsplit(RESTORE_SCREEN).next().unwrap_or(stdout)
}

/// Whether the CLI version understands `--creator`.
///
/// An unparseable version selector is treated as too old; withholding
/// the flag is harmless while passing it to an old build is fatal.
fn supports_creator(cli_version: &str) -> bool {
    let trimmed = cli_version.trim().trim_start_matches('v');
    Version::parse(trimmed).is_ok_and(|version| version >= CREATOR_MIN_VERSION)
}
