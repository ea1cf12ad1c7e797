//! CLI command implementations.

pub mod compliance;
pub mod config;
pub mod evaluate;
pub mod policies;
pub mod score;
pub mod validate;

use crate::{ContextArgs, PolicyArgs};
use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use warden_config::WardenConfig;
use warden_engine::AccessEngine;
use warden_policy::PolicySet;
use warden_types::Context;

/// Exit code for a denied access decision.
pub const EXIT_DENIED: u8 = 2;

/// Exit code for a non-compliant session.
pub const EXIT_NON_COMPLIANT: u8 = 3;

/// Reads the context snapshot named by `input` (`-` for stdin).
pub fn read_context(input: &ContextArgs) -> Result<Context> {
    let text = if input.context.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read context from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&input.context)
            .with_context(|| format!("Failed to read context {}", input.context.display()))?
    };

    serde_json::from_str(&text).context("Context is not a valid snapshot")
}

/// The evaluation instant: `--at` when given, otherwise now.
pub fn instant(input: &ContextArgs) -> DateTime<Utc> {
    input.at.unwrap_or_else(Utc::now)
}

/// The configured policy set with command-line overrides applied.
pub fn effective_policies(config: &WardenConfig, args: &PolicyArgs) -> Result<PolicySet> {
    let mut source = config.policies.clone();
    if let Some(file) = &args.policies {
        source.file = Some(file.clone());
    }
    if args.no_seed {
        source.include_seed = false;
    }

    source.load_policies().context("Failed to load policies")
}

pub fn engine(config: &WardenConfig) -> Result<AccessEngine> {
    AccessEngine::new(config.engine.clone()).context("Invalid engine configuration")
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
