use rust_decimal::Decimal;
use thiserror::Error;

/// A pricing configuration or estimate request that cannot be used.
///
/// Structural problems in the static configuration are reported once, when
/// the engine is built. Request problems (unknown keys, bundle range) share
/// the same type so callers render both the same way.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("missing required pricing configuration: {key}")]
    MissingRequired { key: String },
    #[error("invalid day rate for {bound}: {value}. Must be a positive number")]
    InvalidDayRate { bound: &'static str, value: Decimal },
    #[error("day rate min ({min}) cannot be greater than max ({max})")]
    DayRateRange { min: Decimal, max: Decimal },
    #[error("invalid percentage for {key}: {value}. Must be a number between 0 and 1")]
    InvalidPercentage { key: String, value: Decimal },
    #[error("invalid calibration factor: {value}. Must be a positive number")]
    InvalidCalibrationFactor { value: Decimal },
    #[error("invalid multiplier for {category}[{option}]: {value}. Must be a positive number")]
    InvalidMultiplier { category: String, option: String, value: Decimal },
    #[error("invalid project type configuration for {project_type}: {reason}")]
    InvalidProjectType { project_type: String, reason: String },
    #[error("invalid feature configuration for {feature}: {reason}")]
    InvalidFeature { feature: String, reason: String },
    #[error("invalid bundle setting for {key}: {value}. Must not be negative")]
    InvalidBundleSetting { key: &'static str, value: Decimal },
    #[error(
        "phase base percentages total {total}, expected 0.95 (95% of remaining space after discovery)"
    )]
    PhasePercentagesMismatch { total: Decimal },
    #[error("phase name {phase} is reserved for a computed phase")]
    ReservedPhaseName { phase: String },
    #[error("invalid payment threshold for {key}: {value}. Must be a positive number")]
    InvalidPaymentThreshold { key: &'static str, value: Decimal },
    #[error("invalid payment schedule for {schedule}: {reason}")]
    InvalidPaymentSchedule { schedule: &'static str, reason: String },
    #[error("invalid support setting for {key}: {value}. Must be a positive number")]
    InvalidSupportSetting { key: &'static str, value: Decimal },
    #[error("{field} is required")]
    MissingInput { field: &'static str },
    #[error("invalid project type: {0}")]
    UnknownProjectType(String),
    #[error("invalid feature: {0}")]
    UnknownFeature(String),
    #[error("invalid {category} option: {option}")]
    UnknownMultiplierOption { category: &'static str, option: String },
    #[error("bundle quantity must be between 0 and {max}, got {quantity}")]
    InvalidBundleQuantity { quantity: i64, max: u32 },
}

impl ConfigurationError {
    /// Dotted path of the configuration key or request field at fault.
    pub fn key_path(&self) -> String {
        match self {
            Self::MissingRequired { key } | Self::InvalidPercentage { key, .. } => key.clone(),
            Self::InvalidDayRate { bound, .. } => format!("day_rate.{bound}"),
            Self::DayRateRange { .. } => "day_rate".to_string(),
            Self::InvalidCalibrationFactor { .. } => "calibration_factor".to_string(),
            Self::InvalidMultiplier { category, option, .. } => {
                format!("multipliers.{category}.{option}")
            }
            Self::InvalidProjectType { project_type, .. } => {
                format!("project_types.{project_type}.days")
            }
            Self::InvalidFeature { feature, .. } => format!("features.{feature}.days"),
            Self::InvalidBundleSetting { key, .. } => format!("bundles.{key}"),
            Self::PhasePercentagesMismatch { .. } => "phases.base_percentages".to_string(),
            Self::ReservedPhaseName { phase } => format!("phases.base_percentages.{phase}"),
            Self::InvalidPaymentThreshold { key, .. } => {
                format!("payment_schedules.thresholds.{key}")
            }
            Self::InvalidPaymentSchedule { schedule, .. } => {
                format!("payment_schedules.{schedule}")
            }
            Self::InvalidSupportSetting { key, .. } => format!("support.{key}"),
            Self::MissingInput { field } => (*field).to_string(),
            Self::UnknownProjectType(_) => "projectType".to_string(),
            Self::UnknownFeature(_) => "features".to_string(),
            Self::UnknownMultiplierOption { category, .. } => (*category).to_string(),
            Self::InvalidBundleQuantity { .. } => "bundles".to_string(),
        }
    }

    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput { .. }
                | Self::UnknownProjectType(_)
                | Self::UnknownFeature(_)
                | Self::UnknownMultiplierOption { .. }
                | Self::InvalidBundleQuantity { .. }
        )
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("internal estimate failure: {0}")]
    Internal(String),
}

impl EstimateError {
    pub fn overflow(stage: &str) -> Self {
        Self::Internal(format!("arithmetic overflow while computing {stage}"))
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Configuration(error) if error.is_input_error() => "input_validation",
            Self::Configuration(_) => "config_validation",
            Self::Internal(_) => "internal",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self.error_class() {
            "input_validation" => "The request could not be processed. Check inputs and try again.",
            "config_validation" => "The pricing configuration is invalid. Fix it and try again.",
            _ => "An unexpected internal error occurred.",
        }
    }
}
