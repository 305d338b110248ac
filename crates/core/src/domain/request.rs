use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::pricing::MultiplierCategory;

/// One estimate request as supplied by the presentation layer.
///
/// Every field is optional at the type level so that partially filled forms
/// can still be checked by the advisory business rules; the input validator
/// decides what is actually required.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub project_type: Option<String>,
    #[serde(default)]
    pub features: BTreeSet<String>,
    pub bundles: Option<i64>,
    pub complexity: Option<String>,
    pub risk: Option<String>,
    pub speed: Option<String>,
    pub discovery: Option<String>,
    pub support: Option<String>,
    pub compliance: Option<String>,
    pub real_time: Option<String>,
}

impl EstimateRequest {
    pub fn new(project_type: impl Into<String>) -> Self {
        Self { project_type: Some(project_type.into()), ..Self::default() }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.insert(feature.into());
        self
    }

    pub fn with_bundles(mut self, bundles: i64) -> Self {
        self.bundles = Some(bundles);
        self
    }

    pub fn with_choice(mut self, category: MultiplierCategory, option: impl Into<String>) -> Self {
        *self.choice_slot(category) = Some(option.into());
        self
    }

    /// The option selected for `category`, if any.
    pub fn choice(&self, category: MultiplierCategory) -> Option<&str> {
        let choice = match category {
            MultiplierCategory::Complexity => &self.complexity,
            MultiplierCategory::Risk => &self.risk,
            MultiplierCategory::Speed => &self.speed,
            MultiplierCategory::Discovery => &self.discovery,
            MultiplierCategory::Support => &self.support,
            MultiplierCategory::Compliance => &self.compliance,
            MultiplierCategory::RealTime => &self.real_time,
        };
        choice.as_deref()
    }

    fn choice_slot(&mut self, category: MultiplierCategory) -> &mut Option<String> {
        match category {
            MultiplierCategory::Complexity => &mut self.complexity,
            MultiplierCategory::Risk => &mut self.risk,
            MultiplierCategory::Speed => &mut self.speed,
            MultiplierCategory::Discovery => &mut self.discovery,
            MultiplierCategory::Support => &mut self.support,
            MultiplierCategory::Compliance => &mut self.compliance,
            MultiplierCategory::RealTime => &mut self.real_time,
        }
    }
}
