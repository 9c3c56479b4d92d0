//! GitHub API integration.
//!
//! This module provides the typed REST client plus the two reporting
//! surfaces built on it: deployment status tracking and the single-
//! comment PR reporter.

mod client;
mod comments;
mod deployments;
mod types;

pub use client::GithubClient;
pub use comments::{CommentReporter, MESSAGE_PREFIX};
pub use deployments::DeploymentTracker;
pub use types::{
    Comment, CommentAuthor, CreateDeploymentRequest, Deployment, DeploymentState,
    DeploymentStatusRequest,
};
