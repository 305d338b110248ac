use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use estimator_core::{EstimateRequest, MultiplierCategory, PricingDocument, PricingEngine};

use crate::commands::{load_settings, CommandResult, EXIT_CONFIG, EXIT_FAILURE, EXIT_INPUT};

const COMMAND: &str = "estimate";

#[derive(Args, Clone, Debug, Default)]
pub struct EstimateArgs {
    #[arg(long, value_name = "FILE", help = "JSON estimate request, or `-` to read stdin")]
    pub request: Option<PathBuf>,
    #[arg(long, value_name = "FILE", help = "Pricing document (.toml or .json)")]
    pub pricing: Option<PathBuf>,
    #[arg(long)]
    pub project_type: Option<String>,
    #[arg(long = "feature", value_name = "KEY")]
    pub features: Vec<String>,
    #[arg(long)]
    pub bundles: Option<i64>,
    #[arg(long)]
    pub complexity: Option<String>,
    #[arg(long)]
    pub risk: Option<String>,
    #[arg(long)]
    pub speed: Option<String>,
    #[arg(long)]
    pub discovery: Option<String>,
    #[arg(long)]
    pub support: Option<String>,
    #[arg(long)]
    pub compliance: Option<String>,
    #[arg(long)]
    pub real_time: Option<String>,
}

pub fn run(args: EstimateArgs) -> CommandResult {
    let config = match load_settings(args.pricing.clone()) {
        Ok(config) => config,
        Err(message) => {
            return CommandResult::failure(COMMAND, "config_validation", message, EXIT_CONFIG)
        }
    };

    let document = match PricingDocument::load(&config.pricing.path) {
        Ok(document) => document,
        Err(error) => return CommandResult::from_document_error(COMMAND, &error),
    };

    let engine = match PricingEngine::new(&document) {
        Ok(engine) => engine,
        Err(error) => return CommandResult::from_configuration_error(COMMAND, &error),
    };

    let request = match build_request(&args) {
        Ok(request) => request,
        Err(error) if error.downcast_ref::<io::Error>().is_some() => {
            return CommandResult::failure(COMMAND, "io", format!("{error:#}"), EXIT_FAILURE)
        }
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "input_validation",
                format!("{error:#}"),
                EXIT_INPUT,
            )
        }
    };

    match engine.evaluate(&request) {
        Ok(estimate) => match serde_json::to_string_pretty(&estimate) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure(
                COMMAND,
                "serialization",
                format!("failed to render estimate: {error}"),
                EXIT_FAILURE,
            ),
        },
        Err(error) => CommandResult::from_estimate_error(COMMAND, &error),
    }
}

/// The request file (if any) with individual flags layered on top.
pub fn build_request(args: &EstimateArgs) -> Result<EstimateRequest> {
    let mut request = match args.request.as_deref() {
        Some(source) => read_request(source)?,
        None => EstimateRequest::default(),
    };

    if let Some(project_type) = &args.project_type {
        request.project_type = Some(project_type.clone());
    }
    request.features.extend(args.features.iter().cloned());
    if let Some(bundles) = args.bundles {
        request.bundles = Some(bundles);
    }

    let choices = [
        (MultiplierCategory::Complexity, &args.complexity),
        (MultiplierCategory::Risk, &args.risk),
        (MultiplierCategory::Speed, &args.speed),
        (MultiplierCategory::Discovery, &args.discovery),
        (MultiplierCategory::Support, &args.support),
        (MultiplierCategory::Compliance, &args.compliance),
        (MultiplierCategory::RealTime, &args.real_time),
    ];
    for (category, option) in choices {
        if let Some(option) = option {
            request = request.with_choice(category, option.clone());
        }
    }

    Ok(request)
}

fn read_request(source: &Path) -> Result<EstimateRequest> {
    let raw = if source == Path::new("-") {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw).context("failed to read request from stdin")?;
        raw
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("failed to read request file `{}`", source.display()))?
    };

    serde_json::from_str(&raw).context("request is not a valid estimate request JSON document")
}
