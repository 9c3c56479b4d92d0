//! Envlift CLI entrypoint.
//!
//! Thin wrapper that collects inputs (flags or environment variables),
//! builds the run configuration, and hands off to the orchestrator.

use std::path::PathBuf;
use std::process::ExitCode;

use envlift::config::{RepoCoords, RunContext, Settings};
use envlift::error::Result;
use envlift::github::GithubClient;
use envlift::orchestrator::Orchestrator;
use envlift::stackctl::StackctlRunner;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Envlift - single-shot ephemeral environment orchestrator.
#[derive(Parser, Debug)]
#[command(name = "envlift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Platform auth token passed to stackctl.
    #[arg(long, env = "ENVLIFT_TOKEN", hide_env_values = true)]
    token: String,

    /// Comma-separated services specification (name[:image][:version]).
    #[arg(long, env = "ENVLIFT_SERVICES")]
    services: String,

    /// Environment name (lowercased before use).
    #[arg(long, env = "ENVLIFT_NAME")]
    name: String,

    /// Version of the stackctl binary in use.
    #[arg(long, env = "ENVLIFT_CLI_VERSION", default_value = "0.0.0")]
    cli_version: String,

    /// Path to the stackctl binary.
    #[arg(long, env = "ENVLIFT_STACKCTL")]
    stackctl: Option<PathBuf>,

    /// Track the run through GitHub deployments.
    #[arg(long, env = "ENVLIFT_USE_DEPLOYMENTS")]
    use_deployments: bool,

    /// Report failures through PR comments.
    #[arg(long, env = "ENVLIFT_USE_COMMENTS")]
    use_comments: bool,

    /// Attribute environment creation to the triggering actor.
    #[arg(long, env = "ENVLIFT_USE_NAMES")]
    use_names: bool,

    /// Platform service label used in environment URLs.
    #[arg(long, env = "ENVLIFT_SERVICE")]
    service: Option<String>,

    /// Platform domain used in environment URLs.
    #[arg(long, env = "ENVLIFT_DOMAIN")]
    domain: Option<String>,

    /// Repository in owner/repo form.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: String,

    /// Head ref of the triggering pull request, when there is one.
    #[arg(long, env = "GITHUB_HEAD_REF")]
    head_ref: Option<String>,

    /// Fallback git ref.
    #[arg(long = "ref", env = "GITHUB_REF")]
    git_ref: Option<String>,

    /// Identifier of the triggering run.
    #[arg(long, env = "GITHUB_RUN_ID", default_value = "0")]
    run_id: String,

    /// Base URL of the remote host's web UI.
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = "https://github.com")]
    server_url: String,

    /// Pull request number of the triggering event.
    #[arg(long, env = "ENVLIFT_PR_NUMBER")]
    pr_number: Option<u64>,

    /// Login of the triggering actor.
    #[arg(long, env = "GITHUB_ACTOR")]
    actor: Option<String>,

    /// GitHub API token for deployment and comment reporting.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

/// Main entrypoint.
fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let settings = Settings {
        token: cli.token,
        services: cli.services,
        env_name: cli.name.to_lowercase(),
        cli_version: cli.cli_version,
        creator: if cli.use_names { cli.actor } else { None },
        use_deployments: cli.use_deployments,
        use_comments: cli.use_comments,
    };
    settings.validate()?;

    let ctx = RunContext {
        repository: RepoCoords::parse(&cli.repository)?,
        ref_name: cli
            .head_ref
            .filter(|r| !r.is_empty())
            .or(cli.git_ref)
            .unwrap_or_else(|| String::from("?")),
        run_id: cli.run_id,
        server_url: cli.server_url,
        pr_number: cli.pr_number,
        github_token: cli.github_token,
        service: cli.service,
        domain: cli.domain,
    };
    debug!(
        "Orchestrating environment '{}' for {}/{}@{}",
        settings.env_name, ctx.repository.owner, ctx.repository.repo, ctx.ref_name
    );

    let mut runner = StackctlRunner::new(&settings.token);
    if let Some(program) = cli.stackctl {
        runner = runner.with_program(program);
    }

    let github = match ctx.github_token.as_deref() {
        Some(token) => Some(GithubClient::new(token)?),
        None => None,
    };

    let orchestrator = Orchestrator::new(&settings, &ctx, &runner, github.as_ref());
    orchestrator.run().await?;

    Ok(())
}
