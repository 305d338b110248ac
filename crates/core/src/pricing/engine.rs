use std::sync::Arc;

use tracing::{debug, info, warn};

use super::calculator::PricingCalculator;
use super::configuration::{ConfigurationValidator, PricingConfiguration};
use super::document::PricingDocument;
use super::input::InputValidator;
use super::payments::{ConfiguredPaymentScheduler, PaymentScheduler};
use super::phases::{ConfiguredPhaseAllocator, PhaseAllocator};
use super::rules::{BusinessRuleChecker, CompatibilityWarning};
use super::support::{ConfiguredSupportEstimator, SupportEstimator};
use crate::domain::estimate::{Estimate, EstimateResult};
use crate::domain::request::EstimateRequest;
use crate::errors::{ConfigurationError, EstimateError};

/// Runs the full estimate pipeline against one validated configuration.
///
/// The engine holds no per-request state: factors flow from the day
/// calculation into the downstream components as plain values, so a single
/// engine can be shared across threads.
pub struct PricingEngine<
    P = ConfiguredPhaseAllocator,
    S = ConfiguredPaymentScheduler,
    U = ConfiguredSupportEstimator,
> {
    config: Arc<PricingConfiguration>,
    input: InputValidator,
    calculator: PricingCalculator,
    phases: P,
    payments: S,
    support: U,
    rules: BusinessRuleChecker,
}

impl PricingEngine {
    /// Validates `document` and builds an engine with the configured
    /// allocators. Fails on the first configuration violation.
    pub fn new(document: &PricingDocument) -> Result<Self, ConfigurationError> {
        match ConfigurationValidator.validate(document) {
            Ok(config) => Ok(Self::from_configuration(config)),
            Err(error) => {
                warn!(
                    event_name = "pricing.engine.rejected",
                    key_path = %error.key_path(),
                    error = %error,
                    "pricing configuration failed validation"
                );
                Err(error)
            }
        }
    }

    pub fn from_configuration(config: PricingConfiguration) -> Self {
        let phases = ConfiguredPhaseAllocator::new(config.phases.clone());
        let payments = ConfiguredPaymentScheduler::new(config.payment_schedules.clone());
        let support = ConfiguredSupportEstimator::new(config.support);
        Self::with_components(config, phases, payments, support)
    }
}

impl<P, S, U> PricingEngine<P, S, U> {
    pub fn with_components(
        config: PricingConfiguration,
        phases: P,
        payments: S,
        support: U,
    ) -> Self {
        let config = Arc::new(config);
        info!(
            event_name = "pricing.engine.configured",
            project_types = config.project_types.len(),
            features = config.features.len(),
            day_rate_min = %config.day_rate.min,
            day_rate_max = %config.day_rate.max,
            "pricing engine configured"
        );

        Self {
            input: InputValidator::new(Arc::clone(&config)),
            calculator: PricingCalculator::new(Arc::clone(&config)),
            rules: BusinessRuleChecker::new(config.compatibility.clone()),
            config,
            phases,
            payments,
            support,
        }
    }

    pub fn configuration(&self) -> &PricingConfiguration {
        &self.config
    }

    pub fn validate_business_rules(&self, request: &EstimateRequest) -> Vec<String> {
        self.rules.validate_business_rules(request)
    }

    pub fn compatibility_warnings(&self, request: &EstimateRequest) -> Vec<CompatibilityWarning> {
        self.rules.compatibility_warnings(request)
    }
}

impl<P, S, U> PricingEngine<P, S, U>
where
    P: PhaseAllocator,
    S: PaymentScheduler,
    U: SupportEstimator,
{
    /// Validates `request` and computes its estimate. Any validation or
    /// arithmetic failure is returned unchanged.
    pub fn estimate(&self, request: &EstimateRequest) -> Result<EstimateResult, EstimateError> {
        let project_type = request.project_type.as_deref().unwrap_or("unknown");
        debug!(
            event_name = "pricing.estimate.started",
            project_type,
            features = request.features.len(),
            "estimate started"
        );

        let outcome = self.run_pipeline(request);
        match &outcome {
            Ok(result) => info!(
                event_name = "pricing.estimate.completed",
                project_type,
                days = %result.days,
                low = %result.low,
                high = %result.high,
                support = %result.support,
                "estimate completed"
            ),
            Err(error) => warn!(
                event_name = "pricing.estimate.rejected",
                project_type,
                error_class = error.error_class(),
                error = %error,
                "estimate rejected"
            ),
        }
        outcome
    }

    /// [`Self::estimate`] plus the advisory warnings for the same request.
    pub fn evaluate(&self, request: &EstimateRequest) -> Result<Estimate, EstimateError> {
        let result = self.estimate(request)?;
        let warnings = self.validate_business_rules(request);
        let compatibility = self.compatibility_warnings(request);

        if !warnings.is_empty() {
            info!(
                event_name = "pricing.rules.warnings",
                count = warnings.len(),
                structured = compatibility.len(),
                "business rule warnings raised"
            );
        }

        Ok(Estimate { result, warnings, compatibility })
    }

    fn run_pipeline(&self, request: &EstimateRequest) -> Result<EstimateResult, EstimateError> {
        self.input.validate(request)?;

        let calculation = self.calculator.calculate_days(request)?;
        debug!(
            event_name = "pricing.estimate.days_calculated",
            days = %calculation.days,
            "effort days calculated"
        );

        let factors = calculation.factors;
        let total = self.calculator.calculate_pricing(calculation.days, &factors)?;
        let phases = self.phases.calculate_phases(total, factors.discovery)?;
        let payment_schedule = self.payments.calculate_payment_schedule(total)?;
        let support =
            self.support.calculate_support(total.low, factors.support, factors.complexity)?;

        Ok(EstimateResult {
            days: calculation.days,
            low: total.low,
            high: total.high,
            phases,
            payment_schedule,
            support,
        })
    }
}

/// One-shot estimate: validates `document`, then `request`, and returns the
/// result together with its advisory warnings.
pub fn estimate(
    document: &PricingDocument,
    request: &EstimateRequest,
) -> Result<Estimate, EstimateError> {
    PricingEngine::new(document)?.evaluate(request)
}
