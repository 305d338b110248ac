use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::configuration::{Installment, PaymentScheduleSettings};
use super::{checked_product, round_money};
use crate::domain::estimate::{PaymentInstallment, PriceRange};
use crate::errors::EstimateError;

/// Cost bracket that selects the payment plan shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentBracket {
    Small,
    Medium,
    Large,
}

pub trait PaymentScheduler: Send + Sync {
    fn calculate_payment_schedule(
        &self,
        total: PriceRange,
    ) -> Result<Vec<PaymentInstallment>, EstimateError>;
}

#[derive(Clone, Debug, Default)]
pub struct ConfiguredPaymentScheduler {
    settings: PaymentScheduleSettings,
}

impl ConfiguredPaymentScheduler {
    pub fn new(settings: PaymentScheduleSettings) -> Self {
        Self { settings }
    }

    /// `< small_project` is small, `small_project..=medium_project` is medium,
    /// anything above is large.
    pub fn bracket(&self, high: Decimal) -> PaymentBracket {
        let thresholds = self.settings.thresholds;
        if high < thresholds.small_project {
            PaymentBracket::Small
        } else if high <= thresholds.medium_project {
            PaymentBracket::Medium
        } else {
            PaymentBracket::Large
        }
    }

    fn installments(&self, bracket: PaymentBracket) -> &[Installment] {
        match bracket {
            PaymentBracket::Small => &self.settings.small,
            PaymentBracket::Medium => &self.settings.medium,
            PaymentBracket::Large => &self.settings.large,
        }
    }
}

impl PaymentScheduler for ConfiguredPaymentScheduler {
    fn calculate_payment_schedule(
        &self,
        total: PriceRange,
    ) -> Result<Vec<PaymentInstallment>, EstimateError> {
        self.installments(self.bracket(total.high))
            .iter()
            .map(|installment| {
                let low = checked_product("payment", &[total.low, installment.low_percent])?;
                let high = checked_product("payment", &[total.high, installment.high_percent])?;
                Ok(PaymentInstallment {
                    label: installment.label.clone(),
                    low: round_money(low),
                    high: round_money(high),
                })
            })
            .collect()
    }
}
