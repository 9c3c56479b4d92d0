//! Request and response types for the GitHub REST API.

use serde::{Deserialize, Serialize};

/// A deployment record owned by the remote host.
#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    /// Deployment id.
    pub id: u64,
}

/// State of a deployment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    /// The deployment is no longer current.
    Inactive,
    /// The deployment is running.
    InProgress,
    /// The deployment completed successfully.
    Success,
    /// The deployment failed.
    Failure,
}

/// Body of a create-deployment request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateDeploymentRequest {
    /// Git ref to deploy.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Target environment name.
    pub environment: String,
    /// Human-readable description.
    pub description: String,
    /// Status contexts that must pass; empty to skip the check.
    pub required_contexts: Vec<String>,
    /// Whether the environment is expected to be short-lived.
    pub transient_environment: bool,
    /// Whether the host may auto-merge the default branch first.
    pub auto_merge: bool,
}

/// Body of a create-deployment-status request.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentStatusRequest {
    /// New state of the deployment.
    pub state: DeploymentState,
    /// Public URL of the deployed environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_url: Option<String>,
    /// URL of the logs for this deployment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_url: Option<String>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DeploymentStatusRequest {
    /// A bare `inactive` transition.
    #[must_use]
    pub const fn inactive() -> Self {
        Self {
            state: DeploymentState::Inactive,
            environment_url: None,
            log_url: None,
            description: None,
        }
    }
}

/// An issue or pull request comment.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// Comment id.
    pub id: u64,
    /// Comment body.
    #[serde(default)]
    pub body: String,
    /// Author of the comment, when known.
    #[serde(default)]
    pub user: Option<CommentAuthor>,
}

/// Author of a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentAuthor {
    /// Login of the author.
    pub login: String,
    /// Account type (`User`, `Bot`, ...).
    #[serde(rename = "type")]
    pub kind: String,
}
