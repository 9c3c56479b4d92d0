//! Plan fetching from the `stackctl` CLI.
//!
//! Depending on whether the environment already exists, the baseline plan
//! comes from an export of the live environment or from a fresh plan
//! preview computed from the services specification.

use tracing::debug;

use crate::error::{PlanError, Result};
use crate::stackctl::CommandRunner;

use super::blueprint::{Blueprint, parse_documents};

/// Fetches the baseline plan for an environment.
pub struct PlanFetcher<'a, R: CommandRunner> {
    /// CLI runner.
    runner: &'a R,
}

impl<'a, R: CommandRunner> PlanFetcher<'a, R> {
    /// Creates a new plan fetcher.
    #[must_use]
    pub const fn new(runner: &'a R) -> Self {
        Self { runner }
    }

    /// Fetches the plan as an ordered blueprint sequence.
    ///
    /// Existing environments are exported so the baseline reflects their
    /// current configuration; absent environments get a plan preview
    /// computed from the services specification.
    ///
    /// # Errors
    ///
    /// Returns a [`PlanError::FetchFailed`] on a non-zero exit code, or a
    /// [`PlanError::ParseFailed`] if the output stream is malformed.
    pub async fn fetch(
        &self,
        exists: bool,
        env_name: &str,
        services: &str,
    ) -> Result<Vec<Blueprint>> {
        let args: Vec<String> = if exists {
            debug!("Exporting current plan of environment '{env_name}'");
            ["env", "export", "-f", "-", env_name]
                .map(String::from)
                .to_vec()
        } else {
            debug!("Requesting plan preview for environment '{env_name}'");
            ["env", "plan", "-s", services, "-f", "-"]
                .map(String::from)
                .to_vec()
        };

        let output = self.runner.run(&args).await?;
        if output.exit_code != 0 {
            return Err(PlanError::FetchFailed {
                exit_code: output.exit_code,
                output: output.stdout,
            }
            .into());
        }

        let blueprints = parse_documents(&output.stdout)?;
        debug!("Fetched {} blueprint(s)", blueprints.len());
        Ok(blueprints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stackctl::{CommandOutput, MockCommandRunner};

    const PLAN_OUTPUT: &str = r"
Plugin:
  _type: container.BasicPlugin
  Name: web
  Image:
    AlwaysPull: false
    Image: registry.acme.dev/web
    Tag: '1.0'
ServiceDefinitionName: web
";

    #[tokio::test]
    async fn test_export_when_environment_exists() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args == ["env", "export", "-f", "-", "pr-17"])
            .times(1)
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    stdout: PLAN_OUTPUT.to_string(),
                })
            });

        let fetcher = PlanFetcher::new(&runner);
        let plan = fetcher.fetch(true, "pr-17", "web:1.0").await.unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].service_definition_name, "web");
    }

    #[tokio::test]
    async fn test_plan_preview_when_environment_absent() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args == ["env", "plan", "-s", "web:1.0", "-f", "-"])
            .times(1)
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    stdout: PLAN_OUTPUT.to_string(),
                })
            });

        let fetcher = PlanFetcher::new(&runner);
        let plan = fetcher.fetch(false, "pr-17", "web:1.0").await.unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_fatal() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_| {
            Ok(CommandOutput {
                exit_code: 3,
                stdout: String::from("boom"),
            })
        });

        let fetcher = PlanFetcher::new(&runner);
        let err = fetcher
            .fetch(false, "pr-17", "web:1.0")
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("exit_code=3"));
        assert!(message.contains("boom"));
    }
}
