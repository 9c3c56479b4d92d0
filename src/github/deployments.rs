//! Deployment status lifecycle.
//!
//! One deployment record tracks each run: prior records for the ref are
//! deactivated, a new transient record is created and marked in progress,
//! and the terminal state is posted when the run completes.

use tracing::{info, warn};

use crate::config::RunContext;
use crate::error::Result;

use super::client::GithubClient;
use super::types::{CreateDeploymentRequest, DeploymentState, DeploymentStatusRequest};

/// Tracks a run through the host's deployment records.
pub struct DeploymentTracker<'a> {
    /// API client.
    client: &'a GithubClient,
    /// Run context for repository coordinates and URLs.
    ctx: &'a RunContext,
}

impl<'a> DeploymentTracker<'a> {
    /// Creates a new tracker.
    #[must_use]
    pub const fn new(client: &'a GithubClient, ctx: &'a RunContext) -> Self {
        Self { client, ctx }
    }

    /// Starts tracking: deactivates prior deployments for the ref,
    /// creates the new deployment, and marks it in progress.
    ///
    /// Deactivation is best-effort; each prior record is attempted before
    /// the new deployment is created, and individual failures are logged
    /// and swallowed.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails, if the deployment cannot be
    /// created (including an accepted-but-pending answer), or if the
    /// in-progress status cannot be posted.
    pub async fn start(&self, env_name: &str) -> Result<u64> {
        let repo = &self.ctx.repository;

        let prior = self.client.list_deployments(repo, &self.ctx.ref_name).await?;
        for deployment in prior {
            if let Err(e) = self
                .client
                .create_deployment_status(repo, deployment.id, &DeploymentStatusRequest::inactive())
                .await
            {
                warn!("Failed to deactivate deployment {}: {e}", deployment.id);
            }
        }

        let created = self
            .client
            .create_deployment(
                repo,
                &CreateDeploymentRequest {
                    git_ref: self.ctx.ref_name.clone(),
                    environment: env_name.to_string(),
                    description: String::from("Ephemeral environment deployment"),
                    required_contexts: Vec::new(),
                    transient_environment: true,
                    auto_merge: false,
                },
            )
            .await?;

        let environment_url = self.environment_url(env_name);
        self.client
            .create_deployment_status(
                repo,
                created.id,
                &DeploymentStatusRequest {
                    state: DeploymentState::InProgress,
                    environment_url,
                    log_url: None,
                    description: Some(String::from(
                        "The environment deployment is in progress...",
                    )),
                },
            )
            .await?;

        Ok(created.id)
    }

    /// Posts the terminal status of the deployment.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be posted.
    pub async fn finish(&self, deployment_id: u64, env_name: &str, success: bool) -> Result<()> {
        let (state, description) = if success {
            (DeploymentState::Success, "The environment is active.")
        } else {
            (
                DeploymentState::Failure,
                "The environment deployment has failed. See more details in the deployment's output.",
            )
        };

        self.client
            .create_deployment_status(
                &self.ctx.repository,
                deployment_id,
                &DeploymentStatusRequest {
                    state,
                    environment_url: self.environment_url(env_name),
                    log_url: Some(self.ctx.run_url()),
                    description: Some(description.to_string()),
                },
            )
            .await
    }

    /// Computes and logs the environment URL, when configured.
    fn environment_url(&self, env_name: &str) -> Option<String> {
        let url = self.ctx.environment_url(env_name);
        if let Some(url) = &url {
            info!("Deployment url: {url}");
        }
        url
    }
}
