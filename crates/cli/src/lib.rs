pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::estimate::EstimateArgs;

#[derive(Debug, Parser)]
#[command(
    name = "estimator",
    about = "Software project cost and time estimator",
    long_about = "Estimate project days, price ranges, phase costs, payment schedules and support costs from a pricing document.",
    after_help = "Examples:\n  estimator estimate --project-type web_app --feature authentication --complexity medium --risk low --speed normal --discovery no --support no\n  estimator estimate --request request.json\n  estimator validate --pricing config/pricing.toml\n  estimator doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compute an estimate and print it with advisory warnings as JSON")]
    Estimate(EstimateArgs),
    #[command(about = "Validate a pricing document and report what it defines")]
    Validate {
        #[arg(long, value_name = "FILE", help = "Pricing document (.toml or .json)")]
        pricing: Option<PathBuf>,
    },
    #[command(about = "Inspect effective settings with source attribution")]
    Config,
    #[command(about = "Check settings, pricing document and a sample estimate")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Print the reference pricing document")]
    SampleConfig,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Estimate(args) => commands::estimate::run(args),
        Command::Validate { pricing } => commands::validate::run(pricing),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::SampleConfig => commands::sample_config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
