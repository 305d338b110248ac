pub mod calculator;
pub mod configuration;
pub mod document;
pub mod engine;
pub mod input;
pub mod payments;
pub mod phases;
pub mod rules;
pub mod support;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::EstimateError;

/// A named axis whose selected option contributes a multiplicative factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierCategory {
    Complexity,
    Risk,
    Speed,
    Discovery,
    Support,
    Compliance,
    RealTime,
}

impl MultiplierCategory {
    /// Validation order used for configuration documents.
    pub const ALL: [Self; 7] = [
        Self::Complexity,
        Self::Risk,
        Self::Speed,
        Self::Support,
        Self::Discovery,
        Self::Compliance,
        Self::RealTime,
    ];

    /// Categories every request must select, in request validation order.
    pub const REQUIRED: [Self; 5] =
        [Self::Complexity, Self::Risk, Self::Speed, Self::Discovery, Self::Support];

    pub const OPTIONAL: [Self; 2] = [Self::Compliance, Self::RealTime];

    pub fn is_required(self) -> bool {
        !matches!(self, Self::Compliance | Self::RealTime)
    }

    /// Key under `multipliers` in the pricing document.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::Complexity => "complexity",
            Self::Risk => "risk",
            Self::Speed => "speed",
            Self::Discovery => "discovery",
            Self::Support => "support",
            Self::Compliance => "compliance",
            Self::RealTime => "real_time",
        }
    }

    /// Field name on an estimate request.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::RealTime => "realTime",
            other => other.config_key(),
        }
    }
}

pub(crate) fn round_days(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn round_percentage(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
}

pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Multiplies `terms` left to right, failing instead of panicking on overflow.
pub(crate) fn checked_product(stage: &str, terms: &[Decimal]) -> Result<Decimal, EstimateError> {
    terms.iter().try_fold(Decimal::ONE, |acc, term| {
        acc.checked_mul(*term).ok_or_else(|| EstimateError::overflow(stage))
    })
}
