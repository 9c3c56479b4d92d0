//! Error types for the envlift orchestrator.
//!
//! This module provides the error hierarchy for all operations in a run:
//! configuration, external CLI invocation, plan reconciliation, and the
//! GitHub deployment and comment APIs.

use thiserror::Error;

/// The main error type for the envlift orchestrator.
#[derive(Debug, Error)]
pub enum EnvliftError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// External CLI invocation errors.
    #[error("stackctl error: {0}")]
    Tool(#[from] ToolError),

    /// Plan fetching and reconciliation errors.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// GitHub API errors.
    #[error("GitHub API error: {0}")]
    Github(#[from] GithubError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required input was missing or empty.
    #[error("Missing required input: {name}")]
    MissingInput {
        /// Name of the missing input.
        name: String,
    },

    /// A service override token did not match the grammar.
    #[error("Invalid service override '{token}': {reason}")]
    InvalidServiceOverride {
        /// The offending token.
        token: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors from running the external `stackctl` CLI.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The subprocess could not be spawned or its output captured.
    #[error("Failed to run stackctl: {message}")]
    Spawn {
        /// Description of the spawn failure.
        message: String,
    },

    /// The CLI exited non-zero on a create or update.
    #[error("failed to {verb} (exit_code={exit_code}, args={args:?}): {output}")]
    CommandFailed {
        /// The verb that was attempted (`create` or `update`).
        verb: String,
        /// Exit code reported by the CLI.
        exit_code: i32,
        /// Full argument vector passed to the CLI.
        args: Vec<String>,
        /// Raw captured output.
        output: String,
    },
}

/// Plan fetching and reconciliation errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The CLI exited non-zero while exporting or planning.
    #[error("Error planning (exit_code={exit_code}): {output}")]
    FetchFailed {
        /// Exit code reported by the CLI.
        exit_code: i32,
        /// Raw captured output.
        output: String,
    },

    /// The plan output stream could not be parsed.
    #[error("Failed to parse plan document: {message}")]
    ParseFailed {
        /// Description of the parse error.
        message: String,
    },

    /// A blueprint could not be serialized back to a document.
    #[error("Failed to serialize blueprint '{name}': {message}")]
    SerializeFailed {
        /// Service definition name of the blueprint.
        name: String,
        /// Description of the serialization error.
        message: String,
    },

    /// One or more overrides named services absent from the plan.
    #[error("some services do not appear in the plan: {services}")]
    UnresolvedServices {
        /// Comma-joined list of unresolved service names.
        services: String,
    },
}

/// GitHub API errors.
#[derive(Debug, Error)]
pub enum GithubError {
    /// An API request returned a non-success status.
    #[error("GitHub API request failed: {status} - {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error body from the API.
        message: String,
    },

    /// A network-level failure communicating with GitHub.
    #[error("Network error communicating with GitHub: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("Invalid response from GitHub API: {message}")]
    InvalidResponse {
        /// Description of the response issue.
        message: String,
    },

    /// Deployment creation was accepted but not performed synchronously.
    #[error("unable to create deployment: {message}")]
    DeploymentPending {
        /// Message returned by the host.
        message: String,
    },
}

/// Result type alias for envlift operations.
pub type Result<T> = std::result::Result<T, EnvliftError>;

impl ConfigError {
    /// Creates a missing-input error.
    #[must_use]
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingInput { name: name.into() }
    }
}

impl ToolError {
    /// Creates a spawn error with the given message.
    #[must_use]
    pub fn spawn(message: impl Into<String>) -> Self {
        Self::Spawn {
            message: message.into(),
        }
    }
}

impl GithubError {
    /// Creates a request-failed error.
    #[must_use]
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    /// Creates a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }
}
