//! Trust score command.

use super::{engine, instant, print_json, read_context};
use crate::ContextArgs;
use anyhow::Result;
use std::process::ExitCode;
use warden_config::WardenConfig;

pub fn run(config: &WardenConfig, input: &ContextArgs) -> Result<ExitCode> {
    let context = read_context(input)?;
    let score = engine(config)?.calculate_trust_score_at(&context, instant(input));

    print_json(&score)?;
    Ok(ExitCode::SUCCESS)
}
