use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::document::{
    CatalogItemDocument, InstallmentDocument, MultipliersDocument, PaymentSchedulesDocument,
    PricingDocument, SupportDocument,
};
use super::phases::{DEPLOYMENT_PHASE, DISCOVERY_PHASE};
use super::rules::CompatibilityRules;
use super::MultiplierCategory;
use crate::errors::ConfigurationError;

const PHASE_BASE_TOTAL: Decimal = Decimal::from_parts(95, 0, 0, false, 2);
const PHASE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 3);

/// Pricing configuration that has passed [`ConfigurationValidator`].
///
/// Optional document sections are resolved to their defaults, so every
/// calculator reads concrete values. Build one through
/// [`ConfigurationValidator::validate`]; the engine assumes the invariants it
/// checks.
#[derive(Clone, Debug, PartialEq)]
pub struct PricingConfiguration {
    pub day_rate: DayRate,
    pub contingency: Decimal,
    pub project_management: Decimal,
    pub calibration_factor: Decimal,
    pub multipliers: Multipliers,
    pub project_types: BTreeMap<String, CatalogItem>,
    pub features: BTreeMap<String, CatalogItem>,
    pub bundles: BundleSettings,
    pub phases: PhaseSettings,
    pub payment_schedules: PaymentScheduleSettings,
    pub support: SupportSettings,
    pub compatibility: CompatibilityRules,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayRate {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogItem {
    pub days: Decimal,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Multipliers {
    categories: BTreeMap<MultiplierCategory, BTreeMap<String, Decimal>>,
}

impl Multipliers {
    pub fn options(&self, category: MultiplierCategory) -> Option<&BTreeMap<String, Decimal>> {
        self.categories.get(&category)
    }

    pub fn is_configured(&self, category: MultiplierCategory) -> bool {
        self.categories.contains_key(&category)
    }

    pub fn factor(&self, category: MultiplierCategory, option: &str) -> Option<Decimal> {
        self.options(category).and_then(|options| options.get(option)).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleSettings {
    pub max_quantity: u32,
    pub days_per_bundle: Decimal,
    pub description: String,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            max_quantity: 50,
            days_per_bundle: Decimal::new(5, 1),
            description: "Each bundle adds 0.5 days".to_string(),
        }
    }
}

/// Base phase shares of the space left after discovery, in emission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseSettings {
    pub base_percentages: Vec<(String, Decimal)>,
}

impl Default for PhaseSettings {
    fn default() -> Self {
        Self {
            base_percentages: vec![
                ("project_management".to_string(), Decimal::new(15, 2)),
                ("design".to_string(), Decimal::new(10, 2)),
                ("build".to_string(), Decimal::new(55, 2)),
                ("qa".to_string(), Decimal::new(15, 2)),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Installment {
    pub label: String,
    pub low_percent: Decimal,
    pub high_percent: Decimal,
}

impl Installment {
    fn new(label: &str, low_percent: Decimal, high_percent: Decimal) -> Self {
        Self { label: label.to_string(), low_percent, high_percent }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentThresholds {
    pub small_project: Decimal,
    pub medium_project: Decimal,
}

impl Default for PaymentThresholds {
    fn default() -> Self {
        Self { small_project: Decimal::from(500), medium_project: Decimal::from(3000) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentScheduleSettings {
    pub thresholds: PaymentThresholds,
    pub small: Vec<Installment>,
    pub medium: Vec<Installment>,
    pub large: Vec<Installment>,
}

impl Default for PaymentScheduleSettings {
    fn default() -> Self {
        Self {
            thresholds: PaymentThresholds::default(),
            small: vec![Installment::new("Full payment on completion", Decimal::ONE, Decimal::ONE)],
            medium: vec![
                Installment::new("Deposit (50%)", Decimal::new(5, 1), Decimal::new(5, 1)),
                Installment::new("Final payment (50%)", Decimal::new(5, 1), Decimal::new(5, 1)),
            ],
            // Low estimates front-load certainty, high estimates hold back a risk allowance.
            large: vec![
                Installment::new("Deposit (40%)", Decimal::new(4, 1), Decimal::new(4, 1)),
                Installment::new("Design Sign Off (25%)", Decimal::new(25, 2), Decimal::new(2, 1)),
                Installment::new(
                    "Initial Build Completed (25%)",
                    Decimal::new(25, 2),
                    Decimal::new(2, 1),
                ),
                Installment::new("Go Live (10%)", Decimal::new(1, 1), Decimal::new(2, 1)),
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportCoefficients {
    pub small: Decimal,
    pub medium: Decimal,
    pub large: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportThresholds {
    pub small: Decimal,
    pub medium: Decimal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SupportSettings {
    pub coefficients: SupportCoefficients,
    pub thresholds: SupportThresholds,
    pub max_monthly: Decimal,
}

impl Default for SupportSettings {
    fn default() -> Self {
        Self {
            coefficients: SupportCoefficients {
                small: Decimal::new(4, 2),
                medium: Decimal::new(3, 2),
                large: Decimal::new(2, 2),
            },
            thresholds: SupportThresholds {
                small: Decimal::from(5000),
                medium: Decimal::from(15000),
            },
            max_monthly: Decimal::from(900),
        }
    }
}

/// Fail-fast validation of a [`PricingDocument`].
///
/// Checks run in a fixed order and the first violation is returned; there is
/// no partial diagnostics mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConfigurationValidator;

impl ConfigurationValidator {
    pub fn validate(
        &self,
        document: &PricingDocument,
    ) -> Result<PricingConfiguration, ConfigurationError> {
        let required = require_top_level(document)?;

        let day_rate = validate_day_rate(document)?;
        validate_percentage("contingency", required.contingency)?;
        validate_percentage("project_management", required.project_management)?;
        if required.calibration_factor <= Decimal::ZERO {
            return Err(ConfigurationError::InvalidCalibrationFactor {
                value: required.calibration_factor,
            });
        }
        let multipliers = validate_multipliers(required.multipliers)?;
        let project_types = validate_catalog(required.project_types, |key, reason| {
            ConfigurationError::InvalidProjectType { project_type: key, reason }
        })?;
        let features = validate_catalog(required.features, |key, reason| {
            ConfigurationError::InvalidFeature { feature: key, reason }
        })?;
        let bundles = validate_bundles(document)?;
        let phases = validate_phases(document)?;
        let payment_schedules = match &document.payment_schedules {
            Some(schedules) => validate_payment_schedules(schedules)?,
            None => PaymentScheduleSettings::default(),
        };
        let support = match &document.support {
            Some(support) => validate_support(support)?,
            None => SupportSettings::default(),
        };

        Ok(PricingConfiguration {
            day_rate,
            contingency: required.contingency,
            project_management: required.project_management,
            calibration_factor: required.calibration_factor,
            multipliers,
            project_types,
            features,
            bundles,
            phases,
            payment_schedules,
            support,
            compatibility: document.compatibility.clone().unwrap_or_default(),
        })
    }
}

struct RequiredSections<'a> {
    contingency: Decimal,
    project_management: Decimal,
    calibration_factor: Decimal,
    multipliers: &'a MultipliersDocument,
    project_types: &'a BTreeMap<String, CatalogItemDocument>,
    features: &'a BTreeMap<String, CatalogItemDocument>,
}

fn require_top_level(document: &PricingDocument) -> Result<RequiredSections<'_>, ConfigurationError> {
    if document.day_rate.is_none() {
        return Err(missing("day_rate"));
    }
    let contingency = document.contingency.ok_or_else(|| missing("contingency"))?;
    let project_management =
        document.project_management.ok_or_else(|| missing("project_management"))?;
    let calibration_factor =
        document.calibration_factor.ok_or_else(|| missing("calibration_factor"))?;
    let multipliers = document.multipliers.as_ref().ok_or_else(|| missing("multipliers"))?;
    let project_types = document.project_types.as_ref().ok_or_else(|| missing("project_types"))?;
    let features = document.features.as_ref().ok_or_else(|| missing("features"))?;

    Ok(RequiredSections {
        contingency,
        project_management,
        calibration_factor,
        multipliers,
        project_types,
        features,
    })
}

fn missing(key: &str) -> ConfigurationError {
    ConfigurationError::MissingRequired { key: key.to_string() }
}

fn validate_day_rate(document: &PricingDocument) -> Result<DayRate, ConfigurationError> {
    let day_rate = document.day_rate.as_ref().ok_or_else(|| missing("day_rate"))?;
    let min = day_rate.min.ok_or_else(|| missing("day_rate.min"))?;
    let max = day_rate.max.ok_or_else(|| missing("day_rate.max"))?;

    if min <= Decimal::ZERO {
        return Err(ConfigurationError::InvalidDayRate { bound: "min", value: min });
    }
    if max <= Decimal::ZERO {
        return Err(ConfigurationError::InvalidDayRate { bound: "max", value: max });
    }
    if min > max {
        return Err(ConfigurationError::DayRateRange { min, max });
    }

    Ok(DayRate { min, max })
}

fn validate_percentage(key: &str, value: Decimal) -> Result<(), ConfigurationError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(ConfigurationError::InvalidPercentage { key: key.to_string(), value });
    }
    Ok(())
}

fn validate_multipliers(document: &MultipliersDocument) -> Result<Multipliers, ConfigurationError> {
    let mut categories = BTreeMap::new();

    for category in MultiplierCategory::ALL {
        let options = match category {
            MultiplierCategory::Complexity => &document.complexity,
            MultiplierCategory::Risk => &document.risk,
            MultiplierCategory::Speed => &document.speed,
            MultiplierCategory::Discovery => &document.discovery,
            MultiplierCategory::Support => &document.support,
            MultiplierCategory::Compliance => &document.compliance,
            MultiplierCategory::RealTime => &document.real_time,
        };

        let Some(options) = options else {
            if category.is_required() {
                return Err(missing(&format!("multipliers.{}", category.config_key())));
            }
            continue;
        };

        for (option, value) in options {
            if *value <= Decimal::ZERO {
                return Err(ConfigurationError::InvalidMultiplier {
                    category: category.config_key().to_string(),
                    option: option.clone(),
                    value: *value,
                });
            }
        }
        categories.insert(category, options.clone());
    }

    Ok(Multipliers { categories })
}

fn validate_catalog(
    items: &BTreeMap<String, CatalogItemDocument>,
    invalid: impl Fn(String, String) -> ConfigurationError,
) -> Result<BTreeMap<String, CatalogItem>, ConfigurationError> {
    let mut catalog = BTreeMap::new();

    for (key, item) in items {
        let Some(days) = item.days else {
            return Err(invalid(key.clone(), "Missing days configuration".to_string()));
        };
        if days < Decimal::ZERO {
            return Err(invalid(key.clone(), format!("Days cannot be negative ({days})")));
        }

        catalog.insert(
            key.clone(),
            CatalogItem {
                days,
                title: item.title.clone().unwrap_or_else(|| key.clone()),
                description: item.description.clone(),
            },
        );
    }

    Ok(catalog)
}

fn validate_bundles(document: &PricingDocument) -> Result<BundleSettings, ConfigurationError> {
    let mut settings = BundleSettings::default();
    let Some(bundles) = &document.bundles else {
        return Ok(settings);
    };

    if let Some(days_per_bundle) = bundles.days_per_bundle {
        if days_per_bundle < Decimal::ZERO {
            return Err(ConfigurationError::InvalidBundleSetting {
                key: "days_per_bundle",
                value: days_per_bundle,
            });
        }
        settings.days_per_bundle = days_per_bundle;
        settings.description = format!("Each bundle adds {days_per_bundle} days");
    }
    if let Some(max_quantity) = bundles.max_quantity {
        settings.max_quantity = max_quantity;
    }
    if let Some(description) = &bundles.description {
        settings.description = description.clone();
    }

    Ok(settings)
}

fn validate_phases(document: &PricingDocument) -> Result<PhaseSettings, ConfigurationError> {
    let Some(base_percentages) =
        document.phases.as_ref().and_then(|phases| phases.base_percentages.as_ref())
    else {
        return Ok(PhaseSettings::default());
    };

    if let Some((phase, _)) = base_percentages
        .iter()
        .find(|(phase, _)| phase == DISCOVERY_PHASE || phase == DEPLOYMENT_PHASE)
    {
        return Err(ConfigurationError::ReservedPhaseName { phase: phase.clone() });
    }

    let total: Decimal = base_percentages.iter().map(|(_, percentage)| *percentage).sum();
    if (total - PHASE_BASE_TOTAL).abs() > PHASE_TOLERANCE {
        return Err(ConfigurationError::PhasePercentagesMismatch { total });
    }

    Ok(PhaseSettings { base_percentages: base_percentages.clone() })
}

fn validate_payment_schedules(
    document: &PaymentSchedulesDocument,
) -> Result<PaymentScheduleSettings, ConfigurationError> {
    let mut settings = PaymentScheduleSettings::default();

    if let Some(thresholds) = &document.thresholds {
        if let Some(small_project) = thresholds.small_project {
            if small_project <= Decimal::ZERO {
                return Err(ConfigurationError::InvalidPaymentThreshold {
                    key: "small_project",
                    value: small_project,
                });
            }
            settings.thresholds.small_project = small_project;
        }
        if let Some(medium_project) = thresholds.medium_project {
            if medium_project <= Decimal::ZERO {
                return Err(ConfigurationError::InvalidPaymentThreshold {
                    key: "medium_project",
                    value: medium_project,
                });
            }
            settings.thresholds.medium_project = medium_project;
        }
    }

    if let Some(small) = &document.small {
        settings.small = validate_schedule("small", small)?;
    }
    if let Some(medium) = &document.medium {
        settings.medium = validate_schedule("medium", medium)?;
    }
    if let Some(large) = &document.large {
        settings.large = validate_schedule("large", large)?;
    }

    Ok(settings)
}

fn validate_schedule(
    schedule: &'static str,
    entries: &[InstallmentDocument],
) -> Result<Vec<Installment>, ConfigurationError> {
    entries
        .iter()
        .map(|entry| {
            let (Some(label), Some(low_percent), Some(high_percent)) =
                (&entry.label, entry.low_percent, entry.high_percent)
            else {
                return Err(ConfigurationError::InvalidPaymentSchedule {
                    schedule,
                    reason: "Missing required fields (label, low_percent, high_percent)"
                        .to_string(),
                });
            };

            validate_percentage(&format!("payment_schedules.{schedule}.low_percent"), low_percent)?;
            validate_percentage(
                &format!("payment_schedules.{schedule}.high_percent"),
                high_percent,
            )?;

            Ok(Installment { label: label.clone(), low_percent, high_percent })
        })
        .collect()
}

fn validate_support(document: &SupportDocument) -> Result<SupportSettings, ConfigurationError> {
    let mut settings = SupportSettings::default();

    if let Some(coefficients) = &document.coefficients {
        let tiers = [
            ("small", coefficients.small, &mut settings.coefficients.small),
            ("medium", coefficients.medium, &mut settings.coefficients.medium),
            ("large", coefficients.large, &mut settings.coefficients.large),
        ];
        for (tier, configured, slot) in tiers {
            if let Some(value) = configured {
                validate_percentage(&format!("support.coefficients.{tier}"), value)?;
                *slot = value;
            }
        }
    }

    if let Some(thresholds) = &document.thresholds {
        if let Some(small) = thresholds.small {
            if small <= Decimal::ZERO {
                return Err(ConfigurationError::InvalidSupportSetting {
                    key: "thresholds.small",
                    value: small,
                });
            }
            settings.thresholds.small = small;
        }
        if let Some(medium) = thresholds.medium {
            if medium <= Decimal::ZERO {
                return Err(ConfigurationError::InvalidSupportSetting {
                    key: "thresholds.medium",
                    value: medium,
                });
            }
            settings.thresholds.medium = medium;
        }
    }

    if let Some(max_monthly) = document.max_monthly {
        if max_monthly <= Decimal::ZERO {
            return Err(ConfigurationError::InvalidSupportSetting {
                key: "max_monthly",
                value: max_monthly,
            });
        }
        settings.max_monthly = max_monthly;
    }

    Ok(settings)
}
