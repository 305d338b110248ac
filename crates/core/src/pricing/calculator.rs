use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::configuration::PricingConfiguration;
use super::{checked_product, round_days, round_money, MultiplierCategory};
use crate::domain::estimate::PriceRange;
use crate::domain::request::EstimateRequest;
use crate::errors::EstimateError;

/// Multipliers resolved for a single request.
///
/// Built fresh by [`PricingCalculator::calculate_days`] and handed to the
/// downstream calculators explicitly; it is never stored on the calculator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factors {
    pub project_management: Decimal,
    pub contingency: Decimal,
    pub calibration_factor: Decimal,
    pub complexity: Decimal,
    pub risk: Decimal,
    pub speed: Decimal,
    pub discovery: Decimal,
    pub support: Decimal,
    pub compliance: Option<Decimal>,
    pub real_time: Option<Decimal>,
}

impl Factors {
    /// Factors that scale effort days. Discovery and support only affect
    /// price and support cost.
    fn day_multipliers(&self) -> Vec<Decimal> {
        let mut terms = vec![self.complexity, self.risk, self.speed];
        terms.extend(self.compliance);
        terms.extend(self.real_time);
        terms
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayCalculation {
    pub days: Decimal,
    pub factors: Factors,
}

/// Day and price calculation. Holds only the shared, read-only
/// configuration, so one instance can serve concurrent requests.
#[derive(Clone, Debug)]
pub struct PricingCalculator {
    config: Arc<PricingConfiguration>,
}

impl PricingCalculator {
    pub fn new(config: Arc<PricingConfiguration>) -> Self {
        Self { config }
    }

    pub fn resolve_factors(&self, request: &EstimateRequest) -> Factors {
        let required = |category| self.choice_factor(request, category).unwrap_or(Decimal::ONE);
        let optional = |category| {
            if self.config.multipliers.is_configured(category) && request.choice(category).is_some()
            {
                Some(self.choice_factor(request, category).unwrap_or(Decimal::ONE))
            } else {
                None
            }
        };

        Factors {
            project_management: self.config.project_management,
            contingency: self.config.contingency,
            calibration_factor: self.config.calibration_factor,
            complexity: required(MultiplierCategory::Complexity),
            risk: required(MultiplierCategory::Risk),
            speed: required(MultiplierCategory::Speed),
            discovery: required(MultiplierCategory::Discovery),
            support: required(MultiplierCategory::Support),
            compliance: optional(MultiplierCategory::Compliance),
            real_time: optional(MultiplierCategory::RealTime),
        }
    }

    /// Effort days for `request`, rounded to one decimal place, together with
    /// the factors resolved on the way.
    pub fn calculate_days(
        &self,
        request: &EstimateRequest,
    ) -> Result<DayCalculation, EstimateError> {
        let factors = self.resolve_factors(request);
        let base = self.base_days(request)?;

        let mut terms = vec![base];
        terms.extend(factors.day_multipliers());
        terms.push(factors.calibration_factor);
        let days = checked_product("days", &terms)?;

        Ok(DayCalculation { days: round_days(days), factors })
    }

    /// Low and high price bounds for `days`, rounded to whole currency units.
    pub fn calculate_pricing(
        &self,
        days: Decimal,
        factors: &Factors,
    ) -> Result<PriceRange, EstimateError> {
        let low = self.estimate_at_rate(days, self.config.day_rate.min, factors)?;
        let high = self.estimate_at_rate(days, self.config.day_rate.max, factors)?;

        Ok(PriceRange { low, high })
    }

    fn estimate_at_rate(
        &self,
        days: Decimal,
        rate: Decimal,
        factors: &Factors,
    ) -> Result<Decimal, EstimateError> {
        let estimate = checked_product(
            "price",
            &[
                days,
                rate,
                Decimal::ONE + factors.project_management,
                factors.discovery,
                Decimal::ONE + factors.contingency,
            ],
        )?;
        Ok(round_money(estimate))
    }

    fn base_days(&self, request: &EstimateRequest) -> Result<Decimal, EstimateError> {
        let project_days = request
            .project_type
            .as_deref()
            .and_then(|project_type| self.config.project_types.get(project_type))
            .map(|item| item.days.floor())
            .unwrap_or(Decimal::ZERO);

        let feature_days = request
            .features
            .iter()
            .filter_map(|feature| self.config.features.get(feature))
            .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.days))
            .ok_or_else(|| EstimateError::overflow("feature days"))?;

        let bundle_days = match request.bundles {
            Some(quantity) if quantity > 0 => checked_product(
                "bundle days",
                &[Decimal::from(quantity), self.config.bundles.days_per_bundle],
            )?,
            _ => Decimal::ZERO,
        };

        project_days
            .checked_add(feature_days)
            .and_then(|days| days.checked_add(bundle_days))
            .ok_or_else(|| EstimateError::overflow("base days"))
    }

    fn choice_factor(
        &self,
        request: &EstimateRequest,
        category: MultiplierCategory,
    ) -> Option<Decimal> {
        let option = request.choice(category)?;
        self.config.multipliers.factor(category, option)
    }
}
