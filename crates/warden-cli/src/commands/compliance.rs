//! Continuous compliance command.

use super::{EXIT_NON_COMPLIANT, effective_policies, engine, instant, print_json, read_context};
use crate::{ContextArgs, PolicyArgs};
use anyhow::Result;
use std::process::ExitCode;
use warden_config::WardenConfig;

/// Prints the compliance result; exits with [`EXIT_NON_COMPLIANT`] on violations.
pub fn run(config: &WardenConfig, input: &ContextArgs, policies: &PolicyArgs) -> Result<ExitCode> {
    let context = read_context(input)?;
    let policies = effective_policies(config, policies)?;

    let result = engine(config)?.perform_continuous_compliance_at(
        &context,
        policies.as_slice(),
        instant(input),
    );
    print_json(&result)?;

    Ok(if result.compliant {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_NON_COMPLIANT)
    })
}
