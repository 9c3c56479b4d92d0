//! Top-level run sequencing.
//!
//! Brackets the create/update path with the deployment status lifecycle
//! and triggers comment reporting from the final outcome. Reconciliation
//! and CLI errors propagate to the caller; a failure status is posted
//! first when a deployment was started, without masking the original
//! error.

use tracing::{error, info};

use crate::config::{RunContext, Settings};
use crate::error::{EnvliftError, Result, ToolError};
use crate::github::{CommentReporter, DeploymentTracker, GithubClient};
use crate::stackctl::{ApplyOutcome, CommandRunner, EnvironmentExecutor, sanitize_output};

/// Sequences one full orchestration run.
pub struct Orchestrator<'a, R: CommandRunner> {
    /// Run settings.
    settings: &'a Settings,
    /// Run context.
    ctx: &'a RunContext,
    /// CLI runner.
    runner: &'a R,
    /// GitHub client, present when a GitHub token was supplied.
    github: Option<&'a GithubClient>,
}

impl<'a, R: CommandRunner> Orchestrator<'a, R> {
    /// Creates a new orchestrator.
    #[must_use]
    pub const fn new(
        settings: &'a Settings,
        ctx: &'a RunContext,
        runner: &'a R,
        github: Option<&'a GithubClient>,
    ) -> Self {
        Self {
            settings,
            ctx,
            runner,
            github,
        }
    }

    /// Runs the full provisioning sequence.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: invalid settings, a failed
    /// deployment-record creation, or any error from the create/update
    /// path. Comment reporting never contributes an error.
    pub async fn run(&self) -> Result<ApplyOutcome> {
        self.settings.validate()?;

        let env_name = self.settings.env_name.as_str();
        let tracker = self
            .github
            .filter(|_| self.settings.use_deployments)
            .map(|client| DeploymentTracker::new(client, self.ctx));

        let deployment_id = match &tracker {
            Some(tracker) => Some(tracker.start(env_name).await?),
            None => None,
        };

        let reporter = self
            .github
            .map(|client| CommentReporter::new(client, self.ctx, self.settings.use_comments));

        let executor = EnvironmentExecutor::new(self.runner, self.settings, &self.ctx.run_id);
        match executor.create_or_update().await {
            Ok(outcome) => {
                if let (Some(tracker), Some(id)) = (&tracker, deployment_id) {
                    tracker.finish(id, env_name, true).await?;
                }
                if let Some(reporter) = &reporter {
                    reporter.report_success().await;
                }
                info!("Environment '{env_name}' is ready");
                Ok(outcome)
            }
            Err(err) => {
                if let (Some(tracker), Some(id)) = (&tracker, deployment_id)
                    && let Err(status_err) = tracker.finish(id, env_name, false).await
                {
                    // keep the original error; the status post is secondary
                    error!("Failed to post failure status: {status_err}");
                }
                if let Some(reporter) = &reporter
                    && let EnvliftError::Tool(ToolError::CommandFailed { verb, output, .. }) = &err
                {
                    reporter.report_failure(verb, sanitize_output(output)).await;
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepoCoords;
    use crate::stackctl::{CommandOutput, MockCommandRunner};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

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

    fn settings() -> Settings {
        Settings {
            token: String::from("t"),
            services: String::from("web:1.1"),
            env_name: String::from("pr-17"),
            cli_version: String::from("0.11.0"),
            creator: None,
            use_deployments: true,
            use_comments: true,
        }
    }

    fn context() -> RunContext {
        RunContext {
            repository: RepoCoords {
                owner: String::from("acme"),
                repo: String::from("shop"),
            },
            ref_name: String::from("feature/login"),
            run_id: String::from("4242"),
            server_url: String::from("https://github.com"),
            pr_number: Some(17),
            github_token: Some(String::from("gh-token")),
            service: None,
            domain: None,
        }
    }

    fn runner_for_update(exit_code: i32, final_stdout: &'static str) -> MockCommandRunner {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|args: &[String]| args[1] == "status")
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    stdout: String::from("Overall status: Healthy"),
                })
            });
        runner
            .expect_run()
            .withf(|args: &[String]| args[1] == "export")
            .returning(|_| {
                Ok(CommandOutput {
                    exit_code: 0,
                    stdout: PLAN_OUTPUT.to_string(),
                })
            });
        runner
            .expect_run()
            .withf(|args: &[String]| args[1] == "update")
            .returning(move |_| {
                Ok(CommandOutput {
                    exit_code,
                    stdout: final_stdout.to_string(),
                })
            });
        runner
    }

    async fn mount_deployment_start(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/repos/acme/shop/deployments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/shop/deployments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_success_posts_success_and_clears_comment() {
        let server = MockServer::start().await;
        mount_deployment_start(&server).await;

        Mock::given(method("POST"))
            .and(path("/repos/acme/shop/deployments/7/statuses"))
            .and(body_partial_json(json!({ "state": "in_progress" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 70 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/shop/deployments/7/statuses"))
            .and(body_partial_json(json!({ "state": "success" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 71 })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/shop/issues/17/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 31,
                "body": format!("{}stale failure", crate::github::MESSAGE_PREFIX),
                "user": { "login": "github-actions[bot]", "type": "Bot" },
            }])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/repos/acme/shop/issues/comments/31"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let runner = runner_for_update(0, "updated");
        let github = GithubClient::with_base_url("gh-token", &server.uri()).unwrap();
        let settings = settings();
        let ctx = context();
        let orchestrator = Orchestrator::new(&settings, &ctx, &runner, Some(&github));

        let outcome = orchestrator.run().await.unwrap();
        assert_eq!(outcome.output, "updated");
    }

    #[tokio::test]
    async fn test_failure_posts_failure_status_and_preserves_error() {
        let server = MockServer::start().await;
        mount_deployment_start(&server).await;

        Mock::given(method("POST"))
            .and(path("/repos/acme/shop/deployments/7/statuses"))
            .and(body_partial_json(json!({ "state": "in_progress" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 70 })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/shop/deployments/7/statuses"))
            .and(body_partial_json(json!({ "state": "failure" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 71 })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/shop/issues/17/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/acme/shop/issues/17/comments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 32 })))
            .expect(1)
            .mount(&server)
            .await;

        let runner = runner_for_update(2, "Overall status: Failed\nReason: quota exceeded");
        let github = GithubClient::with_base_url("gh-token", &server.uri()).unwrap();
        let settings = settings();
        let ctx = context();
        let orchestrator = Orchestrator::new(&settings, &ctx, &runner, Some(&github));

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(
            err,
            EnvliftError::Tool(ToolError::CommandFailed { exit_code: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_runs_without_github_client() {
        let runner = runner_for_update(0, "updated");
        let settings = settings();
        let ctx = context();
        let orchestrator = Orchestrator::new(&settings, &ctx, &runner, None);
        assert!(orchestrator.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_settings_abort_before_any_call() {
        let runner = MockCommandRunner::new();
        let mut settings = settings();
        settings.services = String::new();
        let ctx = context();
        let orchestrator = Orchestrator::new(&settings, &ctx, &runner, None);
        assert!(orchestrator.run().await.is_err());
    }
}
