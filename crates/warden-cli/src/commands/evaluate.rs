//! Access decision command.

use super::{EXIT_DENIED, effective_policies, engine, instant, print_json, read_context};
use crate::{ContextArgs, PolicyArgs};
use anyhow::Result;
use std::process::ExitCode;
use warden_config::WardenConfig;

/// Prints the decision; exits with [`EXIT_DENIED`] when access is denied.
pub fn run(config: &WardenConfig, input: &ContextArgs, policies: &PolicyArgs) -> Result<ExitCode> {
    let context = read_context(input)?;
    let policies = effective_policies(config, policies)?;

    let decision =
        engine(config)?.evaluate_access_at(&context, policies.as_slice(), instant(input));
    print_json(&decision)?;

    Ok(if decision.is_denied() {
        ExitCode::from(EXIT_DENIED)
    } else {
        ExitCode::SUCCESS
    })
}
