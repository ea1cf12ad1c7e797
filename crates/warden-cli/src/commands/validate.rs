//! Policy document validation command.

use crate::style::{SemanticStyle, print_error, print_success};
use anyhow::Result;
use std::path::Path;
use std::process::ExitCode;
use warden_config::read_policy_file;

/// Parses and validates a policy document. Problems are reported on stderr
/// and yield a failing exit code.
pub fn run(file: &Path) -> Result<ExitCode> {
    let set = match read_policy_file(file) {
        Ok(set) => set,
        Err(e) => {
            print_error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Err(e) = set.validate() {
        print_error(&format!("{}: {e}", file.display()));
        return Ok(ExitCode::FAILURE);
    }

    let count = set.len();
    let word = if count == 1 { "policy" } else { "policies" };
    print_success(&format!("{}: {count} {word} valid", file.display()));

    let inactive = set.iter().filter(|p| !p.active).count();
    if inactive > 0 {
        println!("{}", format!("  {inactive} inactive").warning());
    }

    Ok(ExitCode::SUCCESS)
}
