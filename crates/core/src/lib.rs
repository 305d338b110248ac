//! Cost and time estimation for software projects.
//!
//! A [`PricingEngine`] is built once from a validated pricing document and then
//! turns [`EstimateRequest`]s into day counts, price ranges, phase breakdowns,
//! payment schedules and monthly support costs.

pub mod config;
pub mod domain;
pub mod errors;
pub mod fixtures;
pub mod pricing;

pub use domain::estimate::{Estimate, EstimateResult, PaymentInstallment, PhaseCost, PriceRange};
pub use domain::request::EstimateRequest;
pub use errors::{ConfigurationError, EstimateError};
pub use pricing::configuration::{ConfigurationValidator, PricingConfiguration};
pub use pricing::document::{DocumentError, PricingDocument};
pub use pricing::engine::{estimate, PricingEngine};
pub use pricing::rules::{CompatibilityWarning, WarningKind};
pub use pricing::MultiplierCategory;
