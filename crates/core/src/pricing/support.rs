use rust_decimal::Decimal;

use super::configuration::SupportSettings;
use super::{checked_product, round_money};
use crate::errors::EstimateError;

pub trait SupportEstimator: Send + Sync {
    /// Monthly support cost derived from the low estimate.
    fn calculate_support(
        &self,
        low: Decimal,
        support_factor: Decimal,
        complexity_factor: Decimal,
    ) -> Result<Decimal, EstimateError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ConfiguredSupportEstimator {
    settings: SupportSettings,
}

impl ConfiguredSupportEstimator {
    pub fn new(settings: SupportSettings) -> Self {
        Self { settings }
    }

    pub fn coefficient(&self, low: Decimal) -> Decimal {
        let SupportSettings { coefficients, thresholds, .. } = self.settings;
        if low < thresholds.small {
            coefficients.small
        } else if low < thresholds.medium {
            coefficients.medium
        } else {
            coefficients.large
        }
    }
}

impl SupportEstimator for ConfiguredSupportEstimator {
    fn calculate_support(
        &self,
        low: Decimal,
        support_factor: Decimal,
        complexity_factor: Decimal,
    ) -> Result<Decimal, EstimateError> {
        let cost = checked_product(
            "support",
            &[low, self.coefficient(low), support_factor, complexity_factor],
        )?;
        Ok(round_money(cost).min(self.settings.max_monthly))
    }
}
