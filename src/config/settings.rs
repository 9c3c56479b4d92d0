//! Run settings and repository context.
//!
//! Everything the core components need is passed in explicitly through
//! these structs; none of them read process environment variables. The
//! binary entry point is responsible for populating them.

use crate::error::{ConfigError, Result};

/// Settings for one orchestration run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Platform auth token passed to the `stackctl` subprocess.
    pub token: String,
    /// Comma-joined services specification string.
    pub services: String,
    /// Target environment name (already lowercased by the invoker).
    pub env_name: String,
    /// Version of the `stackctl` binary in use.
    pub cli_version: String,
    /// Creator identity to attribute environment creation to, if any.
    pub creator: Option<String>,
    /// Whether to track the run through GitHub deployments.
    pub use_deployments: bool,
    /// Whether to report failures through PR comments.
    pub use_comments: bool,
}

impl Settings {
    /// Validates that all required settings are present.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError::MissingInput`] for the first empty
    /// required field.
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(ConfigError::missing("token").into());
        }
        if self.services.is_empty() {
            return Err(ConfigError::missing("services").into());
        }
        if self.env_name.is_empty() {
            return Err(ConfigError::missing("name").into());
        }
        Ok(())
    }
}

/// Repository coordinates on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoords {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub repo: String,
}

impl RepoCoords {
    /// Parses an `owner/repo` pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not of the form `owner/repo`.
    pub fn parse(value: &str) -> Result<Self> {
        match value.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(ConfigError::missing("repository").into()),
        }
    }
}

/// Context of the triggering run, used for URLs and comment targeting.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Repository the run belongs to.
    pub repository: RepoCoords,
    /// Git ref the environment is deployed from.
    pub ref_name: String,
    /// Identifier of the triggering run, injected into renamed plugins.
    pub run_id: String,
    /// Base URL of the remote host's web UI.
    pub server_url: String,
    /// Pull request number, when the run was triggered by one.
    pub pr_number: Option<u64>,
    /// GitHub API token, when deployment/comment reporting is wanted.
    pub github_token: Option<String>,
    /// Platform service label used in environment URLs.
    pub service: Option<String>,
    /// Platform domain used in environment URLs.
    pub domain: Option<String>,
}

impl RunContext {
    /// Computes the public URL of an environment.
    ///
    /// Returns `None` unless both the service label and the domain are
    /// configured.
    #[must_use]
    pub fn environment_url(&self, env_name: &str) -> Option<String> {
        match (self.service.as_deref(), self.domain.as_deref()) {
            (Some(service), Some(domain)) => {
                Some(format!("https://{service}-{env_name}.{domain}"))
            }
            _ => None,
        }
    }

    /// Computes the URL linking back to the triggering run.
    #[must_use]
    pub fn run_url(&self) -> String {
        format!(
            "{}/{}/{}/actions/runs/{}",
            self.server_url, self.repository.owner, self.repository.repo, self.run_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
            github_token: None,
            service: Some(String::from("web")),
            domain: Some(String::from("preview.acme.dev")),
        }
    }

    #[test]
    fn test_environment_url_requires_both_parts() {
        let mut ctx = context();
        assert_eq!(
            ctx.environment_url("pr-17"),
            Some(String::from("https://web-pr-17.preview.acme.dev"))
        );

        ctx.domain = None;
        assert_eq!(ctx.environment_url("pr-17"), None);

        ctx.domain = Some(String::from("preview.acme.dev"));
        ctx.service = None;
        assert_eq!(ctx.environment_url("pr-17"), None);
    }

    #[test]
    fn test_run_url() {
        let ctx = context();
        assert_eq!(
            ctx.run_url(),
            "https://github.com/acme/shop/actions/runs/4242"
        );
    }

    #[test]
    fn test_repo_coords_parse() {
        let coords = RepoCoords::parse("acme/shop").unwrap();
        assert_eq!(coords.owner, "acme");
        assert_eq!(coords.repo, "shop");

        assert!(RepoCoords::parse("acme").is_err());
        assert!(RepoCoords::parse("/shop").is_err());
    }

    #[test]
    fn test_settings_validate() {
        let settings = Settings {
            token: String::from("t"),
            services: String::from("web:1.0"),
            env_name: String::from("pr-17"),
            cli_version: String::from("0.11.0"),
            creator: None,
            use_deployments: true,
            use_comments: true,
        };
        assert!(settings.validate().is_ok());

        let missing = Settings {
            services: String::new(),
            ..settings
        };
        assert!(missing.validate().is_err());
    }
}
