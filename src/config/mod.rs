//! Configuration for a single orchestration run.
//!
//! This module holds all configuration consumed by the core components:
//! - The run settings supplied by the invoker (token, services, toggles)
//! - The repository/run context used for URLs and comment targeting
//! - The compact per-service override grammar

mod services;
mod settings;

pub use services::{ServiceOverride, ServiceOverrides};
pub use settings::{RepoCoords, RunContext, Settings};
