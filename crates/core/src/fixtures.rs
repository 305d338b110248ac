//! Reference pricing data shared by tests, the CLI `sample-config` command and
//! the readiness checks.

use crate::domain::request::EstimateRequest;
use crate::pricing::configuration::{ConfigurationValidator, PricingConfiguration};
use crate::pricing::document::PricingDocument;
use crate::pricing::MultiplierCategory;

/// The pricing document shipped as `config/pricing.toml`.
pub const REFERENCE_PRICING_TOML: &str = include_str!("../../../config/pricing.toml");

/// Parsed [`REFERENCE_PRICING_TOML`].
///
/// # Panics
///
/// Panics if the embedded document does not parse, which would be a build
/// defect rather than a runtime condition.
pub fn reference_document() -> PricingDocument {
    match PricingDocument::from_toml_str(REFERENCE_PRICING_TOML) {
        Ok(document) => document,
        Err(error) => panic!("embedded reference pricing document is malformed: {error}"),
    }
}

/// Validated [`reference_document`].
///
/// # Panics
///
/// Panics if the embedded document fails validation.
pub fn reference_configuration() -> PricingConfiguration {
    match ConfigurationValidator.validate(&reference_document()) {
        Ok(config) => config,
        Err(error) => panic!("embedded reference pricing document is invalid: {error}"),
    }
}

/// A web application with authentication and two bundles at medium
/// complexity, low risk and normal speed, without discovery or support.
pub fn reference_request() -> EstimateRequest {
    EstimateRequest::new("web_app")
        .with_feature("authentication")
        .with_bundles(2)
        .with_choice(MultiplierCategory::Complexity, "medium")
        .with_choice(MultiplierCategory::Risk, "low")
        .with_choice(MultiplierCategory::Speed, "normal")
        .with_choice(MultiplierCategory::Discovery, "no")
        .with_choice(MultiplierCategory::Support, "no")
}
