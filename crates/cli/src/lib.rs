pub mod bootstrap;
pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use renoquote_core::config::LoadOptions;

use crate::commands::vat_summary::VatSummaryArgs;

#[derive(Debug, Parser)]
#[command(
    name = "renoquote",
    about = "Renovation quote pricing CLI",
    long_about = "Price parsed renovation requests, inspect reference tables and configuration, and run readiness checks.",
    after_help = "Examples:\n  renoquote quote --input request.json --pretty\n  renoquote vat-summary --input request.json --country spain\n  renoquote doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Config file to load instead of renoquote.toml")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Compose a quote from a parsed input JSON document")]
    Quote {
        #[arg(long, default_value = "-", help = "Input file, or `-` for stdin")]
        input: String,
        #[arg(long, help = "Pretty-print the quote")]
        pretty: bool,
    },
    #[command(about = "Summarize VAT per rate bucket for the tasks of a parsed input")]
    VatSummary {
        #[arg(long, default_value = "-", help = "Input file, or `-` for stdin")]
        input: String,
        #[arg(long, help = "Country to tax in (defaults to pricing.vat_country)")]
        country: Option<String>,
        #[arg(long)]
        energy_efficiency: bool,
        #[arg(long)]
        accessibility: bool,
        #[arg(long)]
        building_age_years: Option<u32>,
    },
    #[command(about = "List known tasks, material lists, VAT categories and city multipliers")]
    Tables,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, reference tables and a sample quote")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions {
        require_file: cli.config.is_some(),
        config_path: cli.config,
        ..LoadOptions::default()
    };

    // Commands report config failures themselves; logging only needs a best effort.
    if let Ok(config) = bootstrap::load_config(&options) {
        logging::init_logging(&config);
    }

    let result = match cli.command {
        Command::Quote { input, pretty } => commands::quote::run(&options, &input, pretty),
        Command::VatSummary { input, country, energy_efficiency, accessibility, building_age_years } => {
            let args =
                VatSummaryArgs { country, energy_efficiency, accessibility, building_age_years };
            commands::vat_summary::run(&options, &input, &args)
        }
        Command::Tables => commands::tables::run(&options),
        Command::Config => commands::config::run(&options),
        Command::Doctor { json } => commands::doctor::run(&options, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
