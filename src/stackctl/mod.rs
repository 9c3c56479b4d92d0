//! `stackctl` CLI integration.
//!
//! Everything that touches the external provisioning CLI: the subprocess
//! adapter, the environment existence probe, and the create/update
//! executor.

mod executor;
mod probe;
mod runner;

pub use executor::{ApplyOutcome, EnvironmentExecutor, Verb, sanitize_output};
pub use probe::env_exists;
pub use runner::{CommandOutput, CommandRunner, STACKCTL_BIN, StackctlRunner};

#[cfg(test)]
pub use runner::MockCommandRunner;
