use std::sync::Arc;

use super::configuration::PricingConfiguration;
use super::MultiplierCategory;
use crate::domain::request::EstimateRequest;
use crate::errors::ConfigurationError;

/// Blocking validation of one request against the configured catalog.
/// Stops at the first violation.
#[derive(Clone, Debug)]
pub struct InputValidator {
    config: Arc<PricingConfiguration>,
}

impl InputValidator {
    pub fn new(config: Arc<PricingConfiguration>) -> Self {
        Self { config }
    }

    pub fn validate(&self, request: &EstimateRequest) -> Result<(), ConfigurationError> {
        let project_type = request
            .project_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigurationError::MissingInput { field: "projectType" })?;
        if !self.config.project_types.contains_key(project_type) {
            return Err(ConfigurationError::UnknownProjectType(project_type.to_string()));
        }

        if let Some(unknown) =
            request.features.iter().find(|feature| !self.config.features.contains_key(*feature))
        {
            return Err(ConfigurationError::UnknownFeature(unknown.clone()));
        }

        if let Some(quantity) = request.bundles {
            let max = self.config.bundles.max_quantity;
            if quantity < 0 || quantity > i64::from(max) {
                return Err(ConfigurationError::InvalidBundleQuantity { quantity, max });
            }
        }

        for category in MultiplierCategory::REQUIRED {
            let option = request
                .choice(category)
                .ok_or(ConfigurationError::MissingInput { field: category.field_name() })?;
            self.ensure_known_option(category, option)?;
        }

        for category in MultiplierCategory::OPTIONAL {
            // Optional axes only count when the configuration defines them.
            if !self.config.multipliers.is_configured(category) {
                continue;
            }
            if let Some(option) = request.choice(category) {
                self.ensure_known_option(category, option)?;
            }
        }

        Ok(())
    }

    fn ensure_known_option(
        &self,
        category: MultiplierCategory,
        option: &str,
    ) -> Result<(), ConfigurationError> {
        if self.config.multipliers.factor(category, option).is_none() {
            return Err(ConfigurationError::UnknownMultiplierOption {
                category: category.field_name(),
                option: option.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::InputValidator;
    use crate::domain::request::EstimateRequest;
    use crate::errors::ConfigurationError;
    use crate::fixtures;
    use crate::pricing::MultiplierCategory;

    fn validator() -> InputValidator {
        InputValidator::new(Arc::new(fixtures::reference_configuration()))
    }

    #[test]
    fn complete_request_is_accepted() {
        let request = fixtures::reference_request().with_bundles(50);
        assert_eq!(validator().validate(&request), Ok(()));
    }

    #[test]
    fn project_type_is_required_and_must_be_known() {
        let mut request = fixtures::reference_request();
        request.project_type = None;
        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::MissingInput { field: "projectType" })
        );

        request.project_type = Some("  ".to_string());
        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::MissingInput { field: "projectType" })
        );

        request.project_type = Some("spaceship".to_string());
        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::UnknownProjectType("spaceship".to_string()))
        );
    }

    #[test]
    fn unknown_features_are_rejected() {
        let request = fixtures::reference_request().with_feature("time_travel");
        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::UnknownFeature("time_travel".to_string()))
        );
    }

    #[test]
    fn bundle_quantity_is_range_checked() {
        let request = fixtures::reference_request().with_bundles(51);
        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::InvalidBundleQuantity { quantity: 51, max: 50 })
        );

        let request = fixtures::reference_request().with_bundles(-1);
        assert!(matches!(
            validator().validate(&request),
            Err(ConfigurationError::InvalidBundleQuantity { quantity: -1, .. })
        ));
    }

    #[test]
    fn required_multipliers_must_be_present_and_known() {
        let mut request = fixtures::reference_request();
        request.speed = None;
        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::MissingInput { field: "speed" })
        );

        let request =
            fixtures::reference_request().with_choice(MultiplierCategory::Risk, "extreme");
        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::UnknownMultiplierOption {
                category: "risk",
                option: "extreme".to_string()
            })
        );
    }

    #[test]
    fn optional_multipliers_are_checked_only_when_configured() {
        let request =
            fixtures::reference_request().with_choice(MultiplierCategory::RealTime, "sometimes");
        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::UnknownMultiplierOption {
                category: "realTime",
                option: "sometimes".to_string()
            })
        );

        let mut document = fixtures::reference_document();
        if let Some(multipliers) = document.multipliers.as_mut() {
            multipliers.real_time = None;
        }
        let config = crate::pricing::configuration::ConfigurationValidator
            .validate(&document)
            .expect("document without real_time is valid");
        let validator = InputValidator::new(Arc::new(config));
        assert_eq!(validator.validate(&request), Ok(()));
    }

    #[test]
    fn first_violation_wins() {
        let mut request = fixtures::reference_request()
            .with_feature("time_travel")
            .with_choice(MultiplierCategory::Risk, "extreme");
        request.project_type = Some("spaceship".to_string());

        assert_eq!(
            validator().validate(&request),
            Err(ConfigurationError::UnknownProjectType("spaceship".to_string()))
        );
    }
}
