use std::path::PathBuf;

use estimator_core::{ConfigurationValidator, MultiplierCategory, PricingDocument};

use crate::commands::{load_settings, CommandResult, EXIT_CONFIG};

const COMMAND: &str = "validate";

pub fn run(pricing: Option<PathBuf>) -> CommandResult {
    let config = match load_settings(pricing) {
        Ok(config) => config,
        Err(message) => {
            return CommandResult::failure(COMMAND, "config_validation", message, EXIT_CONFIG)
        }
    };

    let path = config.pricing.path;
    let document = match PricingDocument::load(&path) {
        Ok(document) => document,
        Err(error) => return CommandResult::from_document_error(COMMAND, &error),
    };

    match ConfigurationValidator.validate(&document) {
        Ok(pricing) => {
            let categories = MultiplierCategory::ALL
                .iter()
                .filter(|category| pricing.multipliers.is_configured(**category))
                .count();
            CommandResult::success(
                COMMAND,
                format!(
                    "pricing configuration `{}` is valid: {} project types, {} features, {} multiplier categories",
                    path.display(),
                    pricing.project_types.len(),
                    pricing.features.len(),
                    categories
                ),
            )
        }
        Err(error) => CommandResult::from_configuration_error(COMMAND, &error),
    }
}
