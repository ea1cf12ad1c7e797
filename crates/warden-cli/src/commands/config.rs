//! Configuration display command.

use anyhow::Result;
use std::process::ExitCode;
use warden_config::WardenConfig;

/// Prints the effective configuration as TOML.
pub fn show(config: &WardenConfig) -> Result<ExitCode> {
    print!("{}", config.to_toml()?);
    Ok(ExitCode::SUCCESS)
}
