//! Raw, unvalidated pricing document as it is stored on disk.
//!
//! Every key is optional here so that presence checks are reported by
//! [`ConfigurationValidator`](super::configuration::ConfigurationValidator)
//! with a precise key path instead of a generic parse failure.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use super::rules::CompatibilityRules;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not read pricing document `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse pricing document `{path}`: {source}")]
    Toml { path: PathBuf, source: toml::de::Error },
    #[error("could not parse pricing document `{path}`: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("unsupported pricing document format `{path}` (expected .toml or .json)")]
    UnsupportedFormat { path: PathBuf },
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PricingDocument {
    pub day_rate: Option<DayRateDocument>,
    pub contingency: Option<Decimal>,
    pub project_management: Option<Decimal>,
    pub calibration_factor: Option<Decimal>,
    pub multipliers: Option<MultipliersDocument>,
    pub project_types: Option<BTreeMap<String, CatalogItemDocument>>,
    pub features: Option<BTreeMap<String, CatalogItemDocument>>,
    pub bundles: Option<BundlesDocument>,
    pub phases: Option<PhasesDocument>,
    pub payment_schedules: Option<PaymentSchedulesDocument>,
    pub support: Option<SupportDocument>,
    pub compatibility: Option<CompatibilityRules>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DayRateDocument {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MultipliersDocument {
    pub complexity: Option<BTreeMap<String, Decimal>>,
    pub risk: Option<BTreeMap<String, Decimal>>,
    pub speed: Option<BTreeMap<String, Decimal>>,
    pub discovery: Option<BTreeMap<String, Decimal>>,
    pub support: Option<BTreeMap<String, Decimal>>,
    pub compliance: Option<BTreeMap<String, Decimal>>,
    pub real_time: Option<BTreeMap<String, Decimal>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogItemDocument {
    pub days: Option<Decimal>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BundlesDocument {
    pub max_quantity: Option<u32>,
    pub days_per_bundle: Option<Decimal>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PhasesDocument {
    #[serde(default, deserialize_with = "ordered_percentages")]
    pub base_percentages: Option<Vec<(String, Decimal)>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaymentSchedulesDocument {
    pub thresholds: Option<PaymentThresholdsDocument>,
    pub small: Option<Vec<InstallmentDocument>>,
    pub medium: Option<Vec<InstallmentDocument>>,
    pub large: Option<Vec<InstallmentDocument>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaymentThresholdsDocument {
    pub small_project: Option<Decimal>,
    pub medium_project: Option<Decimal>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InstallmentDocument {
    pub label: Option<String>,
    pub low_percent: Option<Decimal>,
    pub high_percent: Option<Decimal>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SupportDocument {
    pub coefficients: Option<SupportCoefficientsDocument>,
    pub thresholds: Option<SupportThresholdsDocument>,
    pub max_monthly: Option<Decimal>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SupportCoefficientsDocument {
    pub small: Option<Decimal>,
    pub medium: Option<Decimal>,
    pub large: Option<Decimal>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SupportThresholdsDocument {
    pub small: Option<Decimal>,
    pub medium: Option<Decimal>,
}

impl PricingDocument {
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads a `.toml` or `.json` pricing document.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => return Err(DocumentError::UnsupportedFormat { path: path.to_path_buf() }),
        };

        let raw = fs::read_to_string(path)
            .map_err(|source| DocumentError::Read { path: path.to_path_buf(), source })?;

        match format {
            Format::Toml => Self::from_toml_str(&raw)
                .map_err(|source| DocumentError::Toml { path: path.to_path_buf(), source }),
            Format::Json => Self::from_json_str(&raw)
                .map_err(|source| DocumentError::Json { path: path.to_path_buf(), source }),
        }
    }
}

enum Format {
    Toml,
    Json,
}

// Phase order is significant, so the table is read entry by entry in document
// order instead of through a sorted map.
fn ordered_percentages<'de, D>(deserializer: D) -> Result<Option<Vec<(String, Decimal)>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedVisitor;

    impl<'de> Visitor<'de> for OrderedVisitor {
        type Value = Vec<(String, Decimal)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a table of phase name to base percentage")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((phase, percentage)) = map.next_entry::<String, Decimal>()? {
                entries.push((phase, percentage));
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(OrderedVisitor).map(Some)
}
