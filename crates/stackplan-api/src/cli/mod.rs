//! CLI command definitions and dispatch for the `stackplan` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod analyze;
pub mod catalog;
pub mod plan;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Pick a technology stack, check it, and track it in a personal plan.
#[derive(Parser)]
#[command(name = "stackplan", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Account whose plan to use (defaults to `default_account` in config.toml).
    #[arg(long, global = true, env = "STACKPLAN_ACCOUNT")]
    pub account: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List catalog domains.
    Domains,

    /// Show the subdomains, components, and tools of a domain.
    Tools {
        /// Domain id (e.g. web, cloud).
        domain: String,
    },

    /// Analyze a stack selection without saving anything.
    Analyze {
        /// Domain id.
        domain: String,

        /// Tool to pick, as subdomain/component/tool. Repeatable.
        #[arg(short, long = "pick", value_parser = analyze::parse_pick)]
        picks: Vec<analyze::Pick>,
    },

    /// Analyze a selection and commit it to the plan if viable.
    Commit {
        /// Domain id.
        domain: String,

        /// Tool to pick, as subdomain/component/tool. Repeatable.
        #[arg(short, long = "pick", value_parser = analyze::parse_pick, required = true)]
        picks: Vec<analyze::Pick>,
    },

    /// Show or edit the tracked plan.
    Plan {
        #[command(subcommand)]
        action: plan::PlanCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
