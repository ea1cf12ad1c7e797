//! Policy listing command.

use super::{effective_policies, print_json};
use crate::PolicyArgs;
use crate::style::print_policy_table;
use anyhow::Result;
use std::process::ExitCode;
use warden_config::WardenConfig;

/// Lists the effective policies in evaluation order (highest priority first).
pub fn run(config: &WardenConfig, args: &PolicyArgs, json: bool) -> Result<ExitCode> {
    let set = effective_policies(config, args)?;

    if json {
        print_json(&set)?;
    } else {
        print_policy_table(&set.by_priority());
    }

    Ok(ExitCode::SUCCESS)
}
