//! Environment existence probing.

use tracing::debug;

use super::runner::CommandRunner;

/// Substring of the status output indicating a missing environment.
const NOT_FOUND_MARKER: &str = "was not found";

/// Checks whether the named environment already exists.
///
/// A zero exit code means it exists. On a non-zero exit, ambiguous output
/// is still treated as "exists" so an existing environment is never
/// re-created by mistake; only an explicit not-found answer reports
/// absence. A failed invocation also reports absence, falling back to the
/// create path.
pub async fn env_exists<R: CommandRunner>(runner: &R, env_name: &str) -> bool {
    let args: Vec<String> = ["env", "status", env_name].map(String::from).to_vec();

    match runner.run(&args).await {
        Ok(output) => output.exit_code == 0 || !output.stdout.contains(NOT_FOUND_MARKER),
        Err(e) => {
            debug!("Status probe failed, treating environment '{env_name}' as absent: {e}");
            false
        }
    }
}
