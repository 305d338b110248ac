use estimator_core::config::{AppConfig, LoadOptions};
use estimator_core::{
    EstimateRequest, MultiplierCategory, PricingConfiguration, PricingDocument, PricingEngine,
};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_FAILURE, EXIT_OK};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, cause: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {cause}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { EXIT_OK } else { EXIT_FAILURE };

    if json_output {
        let output = serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
        return CommandResult { exit_code, output };
    }

    CommandResult { exit_code, output: render_human(&report) }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass("config_validation", "settings loaded and validated"));
            check_pricing(&config, &mut checks);
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string()));
            for name in ["pricing_document", "pricing_configuration", "sample_estimate"] {
                checks.push(DoctorCheck::skipped(name, "settings did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_pricing(config: &AppConfig, checks: &mut Vec<DoctorCheck>) {
    let path = &config.pricing.path;
    let document = match PricingDocument::load(path) {
        Ok(document) => {
            checks.push(DoctorCheck::pass(
                "pricing_document",
                format!("loaded `{}`", path.display()),
            ));
            document
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("pricing_document", error.to_string()));
            checks.push(DoctorCheck::skipped("pricing_configuration", "no pricing document"));
            checks.push(DoctorCheck::skipped("sample_estimate", "no pricing document"));
            return;
        }
    };

    let engine = match PricingEngine::new(&document) {
        Ok(engine) => {
            checks.push(DoctorCheck::pass(
                "pricing_configuration",
                format!(
                    "{} project types, {} features",
                    engine.configuration().project_types.len(),
                    engine.configuration().features.len()
                ),
            ));
            engine
        }
        Err(error) => {
            checks.push(DoctorCheck::fail(
                "pricing_configuration",
                format!("{} ({})", error, error.key_path()),
            ));
            checks.push(DoctorCheck::skipped("sample_estimate", "pricing configuration is invalid"));
            return;
        }
    };

    let Some(request) = sample_request(engine.configuration()) else {
        checks.push(DoctorCheck::fail(
            "sample_estimate",
            "configuration has no project type to estimate",
        ));
        return;
    };

    match engine.estimate(&request) {
        Ok(result) => checks.push(DoctorCheck::pass(
            "sample_estimate",
            format!("{} days, {} to {}", result.days, result.low, result.high),
        )),
        Err(error) => checks.push(DoctorCheck::fail("sample_estimate", error.to_string())),
    }
}

/// First project type with the first option of every required category.
fn sample_request(config: &PricingConfiguration) -> Option<EstimateRequest> {
    let project_type = config.project_types.keys().next()?;
    let mut request = EstimateRequest::new(project_type.as_str());
    for category in MultiplierCategory::REQUIRED {
        let option = config.multipliers.options(category)?.keys().next()?;
        request = request.with_choice(category, option.as_str());
    }
    Some(request)
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
