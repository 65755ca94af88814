//! Stackplan CLI entry point.
//!
//! Binary name: `stackplan`
//!
//! Parses CLI arguments, initializes tracing, the catalog, and the plan
//! store, then dispatches to the matching command handler.

mod cli;
mod state;

use anyhow::anyhow;
use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use stackplan_observe::{LogFormat, TracingOptions, init_tracing, shutdown_tracing};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingOptions {
        verbosity: cli.verbose,
        quiet: cli.quiet,
        format: if cli.log_json { LogFormat::Json } else { LogFormat::Pretty },
        enable_otel: cli.otel,
    })
    .map_err(|e| anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "stackplan", &mut std::io::stdout());
        return Ok(());
    }

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState::init().await?;
    let account = cli.account.as_deref();

    match cli.command {
        Commands::Domains => cli::catalog::list_domains(&state, cli.json)?,

        Commands::Tools { domain } => cli::catalog::show_tools(&state, &domain, cli.json)?,

        Commands::Analyze { domain, picks } => {
            cli::analyze::handle_analyze(&state, &domain, &picks, cli.json)?;
        }

        Commands::Commit { domain, picks } => {
            cli::analyze::handle_commit(&state, account, &domain, &picks, cli.json).await?;
        }

        Commands::Plan { action } => {
            cli::plan::handle_plan_command(action, &state, account, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled before state init"),
    }

    state.plan_store.shutdown();
    Ok(())
}
