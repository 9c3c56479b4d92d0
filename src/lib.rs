// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Envlift
//!
//! A single-shot orchestrator for ephemeral platform environments, with
//! GitHub deployment tracking and PR comment reporting.
//!
//! ## Overview
//!
//! Envlift drives the `stackctl` CLI to create or update one named
//! environment from a declarative service list, and mirrors the outcome
//! onto the triggering repository:
//!
//! - Fetch or derive the environment's plan and merge per-service
//!   image/version overrides into it
//! - Apply the reconciled manifest with an idempotent create-or-update
//! - Track the run as a GitHub deployment (inactive → `in_progress` →
//!   `success`/`failure`)
//! - Keep at most one marker-tagged PR comment describing the latest
//!   failure, removed again on success
//!
//! ## Architecture
//!
//! One run is a single sequential pass:
//!
//! 1. **Probe**: does the environment exist?
//! 2. **Fetch**: export the live plan, or preview one from the services
//!    specification
//! 3. **Reconcile**: merge overrides, validate completeness, write the
//!    manifest
//! 4. **Apply**: `create` or `update` through the CLI
//!
//! with the deployment lifecycle bracketing the sequence and the comment
//! tracker reacting to the final outcome.
//!
//! ## Modules
//!
//! - [`config`]: run settings, repository context, override grammar
//! - [`plan`]: blueprint types, plan fetching, reconciliation
//! - [`stackctl`]: CLI subprocess adapter, probe, create/update executor
//! - [`github`]: REST client, deployment lifecycle, comment tracker
//! - [`orchestrator`]: top-level sequencing and failure propagation
//!
//! ## Example
//!
//! ```text
//! envlift --token $PLATFORM_TOKEN \
//!     --services web:registry.acme.dev/web:1.4.2,api \
//!     --name pr-17 \
//!     --use-deployments --use-comments
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod github;
pub mod orchestrator;
pub mod plan;
pub mod stackctl;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{RepoCoords, RunContext, ServiceOverride, ServiceOverrides, Settings};
pub use error::{ConfigError, EnvliftError, GithubError, PlanError, Result, ToolError};
pub use github::{CommentReporter, DeploymentTracker, GithubClient};
pub use orchestrator::Orchestrator;
pub use plan::{Blueprint, ContainerImage, ContainerPlugin, PlanFetcher, PlanReconciler, Plugin};
pub use stackctl::{
    ApplyOutcome, CommandOutput, CommandRunner, EnvironmentExecutor, StackctlRunner, Verb,
};
