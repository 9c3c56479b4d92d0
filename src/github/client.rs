//! GitHub REST API client.
//!
//! A thin typed wrapper over the handful of endpoints the orchestrator
//! needs: deployments, deployment statuses, and issue comments.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, header};
use serde::Deserialize;
use std::time::Duration;
use tracing::trace;

use crate::config::RepoCoords;
use crate::error::{GithubError, Result};

use super::types::{
    Comment, CreateDeploymentRequest, Deployment, DeploymentStatusRequest,
};

/// GitHub REST API base URL.
const GITHUB_API_URL: &str = "https://api.github.com";

/// Media type for REST API requests.
const ACCEPT_HEADER: &str = "application/vnd.github+json";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error body shape returned by the API.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    message: String,
}

/// GitHub REST API client.
#[derive(Debug, Clone)]
pub struct GithubClient {
    /// HTTP client.
    client: Client,
    /// API token.
    token: String,
    /// API base URL; overridable for tests.
    base_url: String,
}

impl GithubClient {
    /// Creates a client against the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Creates a client against a custom API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(concat!("envlift/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GithubError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds a request with auth and accept headers.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        trace!("GitHub API {method} {path}");
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, ACCEPT_HEADER)
    }

    /// Sends a request and maps transport errors.
    async fn send(builder: RequestBuilder) -> Result<Response> {
        builder
            .send()
            .await
            .map_err(|e| GithubError::network(format!("Request failed: {e}")).into())
    }

    /// Turns a non-success response into a typed error.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(GithubError::request(status.as_u16(), message).into())
    }

    /// Decodes a JSON response body.
    async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T> {
        response.json().await.map_err(|e| {
            GithubError::InvalidResponse {
                message: format!("Failed to parse response: {e}"),
            }
            .into()
        })
    }

    /// Lists deployments for a ref.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_deployments(
        &self,
        repo: &RepoCoords,
        ref_name: &str,
    ) -> Result<Vec<Deployment>> {
        let path = format!("/repos/{}/{}/deployments", repo.owner, repo.repo);
        let builder = self
            .request(Method::GET, &path)
            .query(&[("ref", ref_name)]);
        let response = Self::check(Self::send(builder).await?).await?;
        Self::decode(response).await
    }

    /// Creates a deployment.
    ///
    /// An accepted-but-pending (202) answer means the host did not create
    /// the record synchronously and surfaces as a hard error.
    ///
    /// # Errors
    ///
    /// Returns [`GithubError::DeploymentPending`] on a 202 answer, or a
    /// request error otherwise.
    pub async fn create_deployment(
        &self,
        repo: &RepoCoords,
        request: &CreateDeploymentRequest,
    ) -> Result<Deployment> {
        let path = format!("/repos/{}/{}/deployments", repo.owner, repo.repo);
        let builder = self.request(Method::POST, &path).json(request);
        let response = Self::send(builder).await?;

        if response.status() == StatusCode::ACCEPTED {
            let body: ApiMessage = Self::decode(response).await?;
            return Err(GithubError::DeploymentPending {
                message: body.message,
            }
            .into());
        }

        let response = Self::check(response).await?;
        Self::decode(response).await
    }

    /// Posts a deployment status transition.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_deployment_status(
        &self,
        repo: &RepoCoords,
        deployment_id: u64,
        request: &DeploymentStatusRequest,
    ) -> Result<()> {
        let path = format!(
            "/repos/{}/{}/deployments/{deployment_id}/statuses",
            repo.owner, repo.repo
        );
        let builder = self.request(Method::POST, &path).json(request);
        Self::check(Self::send(builder).await?).await?;
        Ok(())
    }

    /// Lists comments on an issue or pull request.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_issue_comments(
        &self,
        repo: &RepoCoords,
        issue_number: u64,
    ) -> Result<Vec<Comment>> {
        let path = format!(
            "/repos/{}/{}/issues/{issue_number}/comments",
            repo.owner, repo.repo
        );
        let response = Self::check(Self::send(self.request(Method::GET, &path)).await?).await?;
        Self::decode(response).await
    }

    /// Creates a comment on an issue or pull request.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_issue_comment(
        &self,
        repo: &RepoCoords,
        issue_number: u64,
        body: &str,
    ) -> Result<Comment> {
        let path = format!(
            "/repos/{}/{}/issues/{issue_number}/comments",
            repo.owner, repo.repo
        );
        let builder = self
            .request(Method::POST, &path)
            .json(&serde_json::json!({ "body": body }));
        let response = Self::check(Self::send(builder).await?).await?;
        Self::decode(response).await
    }

    /// Updates an existing comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn update_issue_comment(
        &self,
        repo: &RepoCoords,
        comment_id: u64,
        body: &str,
    ) -> Result<Comment> {
        let path = format!(
            "/repos/{}/{}/issues/comments/{comment_id}",
            repo.owner, repo.repo
        );
        let builder = self
            .request(Method::PATCH, &path)
            .json(&serde_json::json!({ "body": body }));
        let response = Self::check(Self::send(builder).await?).await?;
        Self::decode(response).await
    }

    /// Deletes a comment.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn delete_issue_comment(
        &self,
        repo: &RepoCoords,
        comment_id: u64,
    ) -> Result<()> {
        let path = format!(
            "/repos/{}/{}/issues/comments/{comment_id}",
            repo.owner, repo.repo
        );
        Self::check(Self::send(self.request(Method::DELETE, &path)).await?).await?;
        Ok(())
    }
}
