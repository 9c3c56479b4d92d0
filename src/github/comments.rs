//! PR comment state tracker.
//!
//! The orchestrator owns at most one comment per pull request, identified
//! by a hidden marker at the start of the body. Failures upsert it with
//! the latest reason; success deletes it. Comment-API failures are logged
//! and swallowed so reporting never fails a run.

use tracing::{debug, error};

use crate::config::RunContext;
use crate::error::Result;

use super::client::GithubClient;

/// Hidden marker identifying the single comment this tool owns.
pub const MESSAGE_PREFIX: &str = "<!-- envlift -->";

/// Login of the platform's bot identity.
const BOT_LOGIN: &str = "github-actions[bot]";

/// Reports run outcomes through a single marked PR comment.
pub struct CommentReporter<'a> {
    /// API client.
    client: &'a GithubClient,
    /// Run context for repository coordinates and the PR number.
    ctx: &'a RunContext,
    /// Whether comment reporting is enabled at all.
    enabled: bool,
}

impl<'a> CommentReporter<'a> {
    /// Creates a new reporter.
    #[must_use]
    pub const fn new(client: &'a GithubClient, ctx: &'a RunContext, enabled: bool) -> Self {
        Self {
            client,
            ctx,
            enabled,
        }
    }

    /// Reports a failed environment operation.
    ///
    /// The status and reason are extracted from the sanitized tool
    /// output; without both lines there is nothing actionable to report
    /// and no comment is posted. API failures are logged and swallowed.
    pub async fn report_failure(&self, verb: &str, output: &str) {
        let Some((status, reason)) = extract_failure(output) else {
            return;
        };

        let message = format!(
            "{} environment has {} due to:\n",
            capitalize(verb),
            status.to_lowercase()
        );
        error!("{message}\n{reason}");

        if !self.enabled {
            return;
        }
        let Some(pr_number) = self.ctx.pr_number.filter(|n| *n > 0) else {
            return;
        };

        let body = format!(
            "{message}`{reason}`\n[See related run]({})",
            self.ctx.run_url()
        );
        if let Err(e) = self.upsert(pr_number, &body).await {
            debug!("Unable to post a comment: {e}");
        }
    }

    /// Reports a successful run by removing the marked comment, if any.
    ///
    /// API failures are logged and swallowed.
    pub async fn report_success(&self) {
        if !self.enabled {
            return;
        }
        let Some(pr_number) = self.ctx.pr_number.filter(|n| *n > 0) else {
            return;
        };

        if let Err(e) = self.delete_if_exists(pr_number).await {
            debug!("Unable to delete a comment: {e}");
        }
    }

    /// Finds the id of the marked comment, if one exists.
    ///
    /// Filters to comments authored by the platform bot whose body starts
    /// with the marker and picks the first match.
    async fn find_comment_id(&self, pr_number: u64) -> Result<Option<u64>> {
        let comments = self
            .client
            .list_issue_comments(&self.ctx.repository, pr_number)
            .await?;

        let found = comments.into_iter().find(|comment| {
            comment
                .user
                .as_ref()
                .is_some_and(|user| user.login == BOT_LOGIN && user.kind == "Bot")
                && comment.body.starts_with(MESSAGE_PREFIX)
        });

        match &found {
            Some(comment) => debug!("Found previous comment: {}", comment.id),
            None => debug!("Found previous comment: [none]"),
        }

        Ok(found.map(|comment| comment.id))
    }

    /// Updates the marked comment or creates it.
    async fn upsert(&self, pr_number: u64, message: &str) -> Result<()> {
        let repo = &self.ctx.repository;
        let body = format!("{MESSAGE_PREFIX}{message}");

        match self.find_comment_id(pr_number).await? {
            Some(comment_id) => {
                self.client
                    .update_issue_comment(repo, comment_id, &body)
                    .await?;
            }
            None => {
                self.client
                    .create_issue_comment(repo, pr_number, &body)
                    .await?;
            }
        }
        Ok(())
    }

    /// Deletes the marked comment when present.
    async fn delete_if_exists(&self, pr_number: u64) -> Result<()> {
        if let Some(comment_id) = self.find_comment_id(pr_number).await? {
            self.client
                .delete_issue_comment(&self.ctx.repository, comment_id)
                .await?;
        }
        Ok(())
    }
}

/// Extracts the `Overall status:` and `Reason:` lines from tool output.
///
/// Both lines must be present; the first occurrence of each wins.
fn extract_failure(output: &str) -> Option<(String, String)> {
    let mut status = None;
    let mut reason = None;

    for line in output.lines() {
        if status.is_none()
            && let Some(rest) = line.strip_prefix("Overall status: ")
        {
            status = Some(rest.trim().to_string());
        } else if reason.is_none()
            && let Some(rest) = line.strip_prefix("Reason: ")
        {
            reason = Some(rest.trim().to_string());
        }
    }

    status.zip(reason)
}

/// Uppercases the first character of a verb.
fn capitalize(verb: &str) -> String {
    let mut chars = verb.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}
