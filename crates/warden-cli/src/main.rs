//! Warden CLI.
//!
//! Evaluates zero-trust access decisions for JSON context snapshots against
//! the configured policy set.
//!
//! # Quick Start
//!
//! ```bash
//! # Score a request context
//! warden score --context request.json
//!
//! # Decide access (exit code 2 on deny)
//! warden evaluate --context request.json --policies policies.toml
//!
//! # Re-check a live session (exit code 3 when non-compliant)
//! warden compliance --context session.json
//! ```

mod commands;
mod style;

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use warden_config::ConfigLoader;

/// Warden - zero-trust access decisions from the command line.
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding warden.toml.
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Policy set selection shared by the evaluating commands.
#[derive(Args, Clone)]
pub struct PolicyArgs {
    /// Policy document (JSON or TOML); overrides `policies.file`.
    #[arg(long)]
    policies: Option<PathBuf>,

    /// Leave out the built-in seed policies.
    #[arg(long)]
    no_seed: bool,
}

/// Input shared by the commands that read a context snapshot.
#[derive(Args, Clone)]
pub struct ContextArgs {
    /// Context snapshot as JSON (`-` reads stdin).
    #[arg(short, long)]
    context: PathBuf,

    /// Evaluate as of this instant (RFC 3339) instead of now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the trust score of a context.
    Score {
        #[command(flatten)]
        input: ContextArgs,
    },

    /// Decide whether a request may proceed.
    Evaluate {
        #[command(flatten)]
        input: ContextArgs,

        #[command(flatten)]
        policies: PolicyArgs,
    },

    /// Check a live session for unmet policy requirements.
    Compliance {
        #[command(flatten)]
        input: ContextArgs,

        #[command(flatten)]
        policies: PolicyArgs,
    },

    /// List the effective policy set.
    Policies {
        #[command(flatten)]
        policies: PolicyArgs,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Validate a policy document.
    Validate {
        /// Policy document (JSON or TOML).
        file: PathBuf,
    },

    /// Show the effective configuration as TOML.
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    style::set_no_color(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    let config = ConfigLoader::new()
        .with_project_dir(&cli.project)
        .load()
        .context("Failed to load configuration")?;

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    match cli.command {
        Commands::Score { input } => commands::score::run(&config, &input),
        Commands::Evaluate { input, policies } => {
            commands::evaluate::run(&config, &input, &policies)
        }
        Commands::Compliance { input, policies } => {
            commands::compliance::run(&config, &input, &policies)
        }
        Commands::Policies { policies, json } => commands::policies::run(&config, &policies, json),
        Commands::Validate { file } => commands::validate::run(&file),
        Commands::Config => commands::config::show(&config),
    }
}
