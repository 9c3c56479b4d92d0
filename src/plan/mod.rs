//! Environment plan handling.
//!
//! This module covers the plan pipeline: fetching a baseline plan from
//! the CLI, merging user overrides into it, and emitting the manifest
//! handed to the create/update call.

mod blueprint;
mod fetcher;
mod reconciler;

pub use blueprint::{
    Blueprint, CONTAINER_PLUGIN_KIND, ContainerImage, ContainerPlugin, Plugin, parse_documents,
};
pub use fetcher::PlanFetcher;
pub use reconciler::PlanReconciler;
