use estimator_core::fixtures::REFERENCE_PRICING_TOML;

use crate::commands::{CommandResult, EXIT_OK};

pub fn run() -> CommandResult {
    CommandResult { exit_code: EXIT_OK, output: REFERENCE_PRICING_TOML.trim_end().to_string() }
}
