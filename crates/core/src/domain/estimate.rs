use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pricing::rules::CompatibilityWarning;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseCost {
    pub phase: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstallment {
    pub label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
}

/// Low and high monetary bounds for the whole project.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub days: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    pub phases: Vec<PhaseCost>,
    pub payment_schedule: Vec<PaymentInstallment>,
    #[serde(with = "rust_decimal::serde::float")]
    pub support: Decimal,
}

impl EstimateResult {
    pub fn phase(&self, name: &str) -> Option<&PhaseCost> {
        self.phases.iter().find(|phase| phase.phase == name)
    }
}

/// Numeric estimate plus the advisory warnings raised for the same request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub result: EstimateResult,
    pub warnings: Vec<String>,
    pub compatibility: Vec<CompatibilityWarning>,
}
