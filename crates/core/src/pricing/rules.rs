//! Advisory cross-field rules. Nothing here blocks an estimate.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::request::EstimateRequest;

const UNREALISTIC_TIMELINE: &str = "Very high complexity with urgent timeline may not be realistic. Consider extending the timeline or reducing complexity.";
const LONG_TERM_SUPPORT_COST: &str =
    "Very high risk with high support requirements may significantly impact long-term costs.";
const COMPLIANCE_REAL_TIME_COST: &str = "Very high compliance requirements with very high real-time requirements may significantly increase project complexity and cost.";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityRules {
    #[serde(default)]
    pub project_type_incompatibilities: BTreeMap<String, ProjectTypeRule>,
    #[serde(default)]
    pub feature_incompatibilities: KeyedRules<ConflictRule>,
    #[serde(default)]
    pub feature_dependencies: KeyedRules<DependencyRule>,
}

/// Named rules in the order the document lists them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedRules<T>(Vec<(String, T)>);

impl<T> KeyedRules<T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.0.iter().find(|(key, _)| key == name).map(|(_, rule)| rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(key, rule)| (key.as_str(), rule))
    }
}

impl<T> Default for KeyedRules<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: Serialize> Serialize for KeyedRules<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, rule)| (key, rule)))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for KeyedRules<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyedVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for KeyedVisitor<T> {
            type Value = KeyedRules<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a table of rules keyed by name")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, T>()? {
                    entries.push(entry);
                }
                Ok(KeyedRules(entries))
            }
        }

        deserializer.deserialize_map(KeyedVisitor(PhantomData))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTypeRule {
    pub incompatible_features: Vec<String>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    pub conflicting_features: Vec<String>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRule {
    pub required_features: Vec<String>,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Incompatibility,
    Conflict,
    Dependency,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub message: String,
    /// Incompatible, conflicting or missing features, depending on `kind`.
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct BusinessRuleChecker {
    rules: CompatibilityRules,
}

impl BusinessRuleChecker {
    pub fn new(rules: CompatibilityRules) -> Self {
        Self { rules }
    }

    /// Every applicable warning as display text, configured rules and
    /// built-in heuristics alike.
    pub fn validate_business_rules(&self, request: &EstimateRequest) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(warning) = self.project_type_incompatibility(request) {
            warnings.push(warning.message);
        }

        let heuristics = [
            (
                request.complexity.as_deref(),
                "very_high",
                request.speed.as_deref(),
                "urgent",
                UNREALISTIC_TIMELINE,
            ),
            (
                request.risk.as_deref(),
                "very_high",
                request.support.as_deref(),
                "high",
                LONG_TERM_SUPPORT_COST,
            ),
            (
                request.compliance.as_deref(),
                "very_high",
                request.real_time.as_deref(),
                "very_high",
                COMPLIANCE_REAL_TIME_COST,
            ),
        ];
        for (left, left_trigger, right, right_trigger, message) in heuristics {
            if left == Some(left_trigger) && right == Some(right_trigger) {
                warnings.push(message.to_string());
            }
        }

        warnings.extend(self.feature_combination_issues(request).into_iter().map(|w| w.message));
        warnings
    }

    /// Configuration-driven warnings with the features involved.
    pub fn compatibility_warnings(&self, request: &EstimateRequest) -> Vec<CompatibilityWarning> {
        let mut warnings: Vec<CompatibilityWarning> =
            self.project_type_incompatibility(request).into_iter().collect();
        warnings.extend(self.feature_combination_issues(request));
        warnings
    }

    fn project_type_incompatibility(
        &self,
        request: &EstimateRequest,
    ) -> Option<CompatibilityWarning> {
        let project_type = request.project_type.as_deref()?;
        let rule = self.rules.project_type_incompatibilities.get(project_type)?;

        let incompatible: Vec<String> = request
            .features
            .iter()
            .filter(|feature| rule.incompatible_features.contains(*feature))
            .cloned()
            .collect();

        (!incompatible.is_empty()).then(|| CompatibilityWarning {
            kind: WarningKind::Incompatibility,
            message: rule.message.clone(),
            features: incompatible,
        })
    }

    fn feature_combination_issues(&self, request: &EstimateRequest) -> Vec<CompatibilityWarning> {
        let mut issues = Vec::new();

        for (_, rule) in self.rules.feature_incompatibilities.iter() {
            let selected: Vec<String> = request
                .features
                .iter()
                .filter(|feature| rule.conflicting_features.contains(*feature))
                .cloned()
                .collect();

            if selected.len() > 1 {
                issues.push(CompatibilityWarning {
                    kind: WarningKind::Conflict,
                    message: rule.message.clone(),
                    features: selected,
                });
            }
        }

        for (feature, rule) in self.rules.feature_dependencies.iter() {
            if !request.features.contains(feature) {
                continue;
            }

            let missing: Vec<String> = rule
                .required_features
                .iter()
                .filter(|required| !request.features.contains(*required))
                .cloned()
                .collect();

            if !missing.is_empty() {
                issues.push(CompatibilityWarning {
                    kind: WarningKind::Dependency,
                    message: rule.message.clone(),
                    features: missing,
                });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::{BusinessRuleChecker, CompatibilityRules, DependencyRule, WarningKind};
    use crate::domain::request::EstimateRequest;
    use crate::pricing::MultiplierCategory;

    fn checker() -> BusinessRuleChecker {
        let rules: CompatibilityRules = toml::from_str(
            r#"
[project_type_incompatibilities.mobile_app]
incompatible_features = ["desktop_only_feature"]
message = "Mobile apps cannot use desktop-only features."

[project_type_incompatibilities.api]
incompatible_features = ["ui_heavy_feature"]
message = "APIs should not include UI-heavy features."

[feature_incompatibilities.conflict_1]
conflicting_features = ["feature_a", "feature_b"]
message = "Feature A and Feature B cannot be used together."

[feature_incompatibilities.conflict_2]
conflicting_features = ["feature_x", "feature_y", "feature_z"]
message = "Features X, Y, and Z are mutually exclusive."

[feature_dependencies.advanced_reporting]
required_features = ["basic_reporting"]
message = "Advanced reporting requires basic reporting to be enabled."

[feature_dependencies.payment_processing]
required_features = ["authentication"]
message = "Payment processing requires authentication to be enabled."
"#,
        )
        .expect("rules should parse");
        BusinessRuleChecker::new(rules)
    }

    #[test]
    fn compatible_request_raises_no_warnings() {
        let request = EstimateRequest::new("web_app")
            .with_feature("authentication")
            .with_feature("basic_reporting")
            .with_choice(MultiplierCategory::Complexity, "medium")
            .with_choice(MultiplierCategory::Speed, "normal")
            .with_choice(MultiplierCategory::Risk, "low")
            .with_choice(MultiplierCategory::Support, "low");

        assert!(checker().validate_business_rules(&request).is_empty());
        assert!(checker().compatibility_warnings(&request).is_empty());
    }

    #[test]
    fn urgent_very_high_complexity_is_flagged_without_configured_rules() {
        let checker = BusinessRuleChecker::default();
        let request = EstimateRequest::new("web_app")
            .with_choice(MultiplierCategory::Complexity, "very_high")
            .with_choice(MultiplierCategory::Speed, "urgent");

        let warnings = checker.validate_business_rules(&request);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Very high complexity with urgent timeline may not be realistic"));

        let without_speed = EstimateRequest::new("web_app")
            .with_choice(MultiplierCategory::Complexity, "very_high");
        assert!(checker.validate_business_rules(&without_speed).is_empty());
    }

    #[test]
    fn risk_support_and_compliance_real_time_heuristics_fire() {
        let request = EstimateRequest::new("web_app")
            .with_choice(MultiplierCategory::Risk, "very_high")
            .with_choice(MultiplierCategory::Support, "high");
        let warnings = checker().validate_business_rules(&request);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("may significantly impact long-term costs"));

        let request = EstimateRequest::new("web_app")
            .with_choice(MultiplierCategory::Compliance, "very_high")
            .with_choice(MultiplierCategory::RealTime, "very_high");
        let warnings = checker().validate_business_rules(&request);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("very high real-time requirements"));
    }

    #[test]
    fn project_type_incompatibility_lists_offending_features() {
        let request = EstimateRequest::new("mobile_app")
            .with_feature("desktop_only_feature")
            .with_feature("authentication");

        let warnings = checker().compatibility_warnings(&request);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Incompatibility);
        assert_eq!(warnings[0].message, "Mobile apps cannot use desktop-only features.");
        assert_eq!(warnings[0].features, ["desktop_only_feature"]);
    }

    #[test]
    fn conflicts_need_two_members_of_a_group() {
        let single = EstimateRequest::new("web_app").with_feature("feature_x");
        assert!(checker().compatibility_warnings(&single).is_empty());

        let request = EstimateRequest::new("web_app")
            .with_feature("feature_x")
            .with_feature("feature_z")
            .with_feature("feature_a");
        let warnings = checker().compatibility_warnings(&request);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Conflict);
        assert_eq!(warnings[0].features, ["feature_x", "feature_z"]);
    }

    #[test]
    fn missing_dependencies_are_reported() {
        let request = EstimateRequest::new("web_app")
            .with_feature("payment_processing")
            .with_feature("advanced_reporting")
            .with_feature("basic_reporting");

        let warnings = checker().compatibility_warnings(&request);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::Dependency);
        assert_eq!(warnings[0].features, ["authentication"]);
    }

    #[test]
    fn feature_rules_keep_document_order() {
        let rules: CompatibilityRules = toml::from_str(
            r#"
[feature_dependencies.zeta_export]
required_features = ["zeta"]
message = "Zeta export requires zeta."

[feature_dependencies.alpha_export]
required_features = ["alpha"]
message = "Alpha export requires alpha."
"#,
        )
        .expect("rules should parse");

        let names: Vec<&str> = rules.feature_dependencies.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["zeta_export", "alpha_export"]);
        assert_eq!(
            rules.feature_dependencies.get("alpha_export"),
            Some(&DependencyRule {
                required_features: vec!["alpha".to_owned()],
                message: "Alpha export requires alpha.".to_owned(),
            })
        );

        let request =
            EstimateRequest::new("web_app").with_feature("alpha_export").with_feature("zeta_export");
        let warnings = BusinessRuleChecker::new(rules).validate_business_rules(&request);
        assert_eq!(warnings, ["Zeta export requires zeta.", "Alpha export requires alpha."]);
    }

    #[test]
    fn all_applicable_rules_fire_together() {
        let request = EstimateRequest::new("api")
            .with_feature("ui_heavy_feature")
            .with_feature("feature_a")
            .with_feature("feature_b")
            .with_feature("payment_processing")
            .with_choice(MultiplierCategory::Complexity, "very_high")
            .with_choice(MultiplierCategory::Speed, "urgent");

        let warnings = checker().validate_business_rules(&request);
        assert_eq!(
            warnings,
            [
                "APIs should not include UI-heavy features.",
                super::UNREALISTIC_TIMELINE,
                "Feature A and Feature B cannot be used together.",
                "Payment processing requires authentication to be enabled.",
            ]
        );
        assert_eq!(checker().compatibility_warnings(&request).len(), 3);
    }
}
