pub mod config;
pub mod doctor;
pub mod estimate;
pub mod sample_config;
pub mod validate;

use std::path::PathBuf;

use estimator_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use estimator_core::{ConfigurationError, DocumentError, EstimateError};
use serde::Serialize;

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INPUT: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<String>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            hint: None,
        };
        Self { exit_code: EXIT_OK, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            hint: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_estimate_error(command: &str, error: &EstimateError) -> Self {
        Self::with_hint(command, error, error.to_string())
    }

    /// Configuration failures name the offending key in the message.
    pub fn from_configuration_error(command: &str, error: &ConfigurationError) -> Self {
        let message = format!("{} ({})", error, error.key_path());
        Self::with_hint(command, &EstimateError::from(error.clone()), message)
    }

    fn with_hint(command: &str, error: &EstimateError, message: String) -> Self {
        let exit_code = match error.error_class() {
            "input_validation" => EXIT_INPUT,
            "config_validation" => EXIT_CONFIG,
            _ => EXIT_FAILURE,
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error.error_class().to_string()),
            message,
            hint: Some(error.user_message().to_string()),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_document_error(command: &str, error: &DocumentError) -> Self {
        match error {
            DocumentError::Read { .. } => {
                Self::failure(command, "io", error.to_string(), EXIT_FAILURE)
            }
            _ => Self::failure(command, "config_validation", error.to_string(), EXIT_CONFIG),
        }
    }
}

/// Settings with an optional `--pricing` override applied.
pub(crate) fn load_settings(pricing: Option<PathBuf>) -> Result<AppConfig, String> {
    let options = LoadOptions {
        overrides: ConfigOverrides { pricing_path: pricing, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    AppConfig::load(options).map_err(|error| format!("configuration issue: {error}"))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
