use std::collections::BTreeSet;

use renoquote_core::config::{AppConfig, LoadOptions};
use renoquote_core::domain::budget::BudgetTier;
use renoquote_core::domain::input::ParsedInput;
use renoquote_core::domain::task::TaskKind;
use renoquote_core::errors::ApplicationError;
use renoquote_core::reference::ReferenceTableError;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::bootstrap::{bootstrap_with_config, load_config, PricingRuntime};
use crate::commands::CommandResult;

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
    #[serde(skip)]
    exit_code: u8,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into(), exit_code: 0 }
    }

    fn fail(name: &'static str, details: impl Into<String>, exit_code: u8) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into(), exit_code }
    }

    fn skipped(name: &'static str) -> Self {
        Self {
            name,
            status: CheckStatus::Skipped,
            details: "skipped because an earlier check failed".to_string(),
            exit_code: 0,
        }
    }
}

pub fn run(options: &LoadOptions, json_output: bool) -> CommandResult {
    let report = build_report(options);
    let exit_code = report
        .checks
        .iter()
        .find(|check| check.status == CheckStatus::Fail)
        .map_or(0, |check| check.exit_code);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(options: &LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match load_config(options) {
        Ok(config) => {
            checks.push(DoctorCheck::pass(
                "config_validation",
                "configuration loaded and validated",
            ));
            match check_reference_tables(config) {
                Ok((check, runtime)) => {
                    checks.push(check);
                    checks.push(check_vat_country(&runtime));
                    checks.push(check_sample_quote(&runtime));
                }
                Err(check) => {
                    checks.push(check);
                    checks.push(DoctorCheck::skipped("vat_country"));
                    checks.push(DoctorCheck::skipped("sample_quote"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string(), error.exit_code()));
            checks.push(DoctorCheck::skipped("reference_tables"));
            checks.push(DoctorCheck::skipped("vat_country"));
            checks.push(DoctorCheck::skipped("sample_quote"));
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

fn check_reference_tables(config: AppConfig) -> Result<(DoctorCheck, PricingRuntime), DoctorCheck> {
    let source = config
        .pricing
        .reference_tables
        .as_deref()
        .map(|path| format!("`{}`", path.display()))
        .unwrap_or_else(|| "builtin tables".to_string());

    match bootstrap_with_config(config) {
        Ok(runtime) => {
            let tables = &runtime.tables;
            let details = format!(
                "{source} valid: {} material tasks, {} labor tasks, {} VAT countries, {} cities",
                tables.materials.tasks.len(),
                tables.labor.tasks.len(),
                tables.vat.rates.len(),
                tables.cities.multipliers.len()
            );
            Ok((DoctorCheck::pass("reference_tables", details), runtime))
        }
        Err(error) => Err(DoctorCheck::fail("reference_tables", error.to_string(), error.exit_code())),
    }
}

fn check_vat_country(runtime: &PricingRuntime) -> DoctorCheck {
    let country = &runtime.config.pricing.vat_country;
    let vat = &runtime.tables.vat;

    if vat.rates.contains_key(country) {
        DoctorCheck::pass("vat_country", format!("`{country}` has configured VAT rates"))
    } else {
        let error = ApplicationError::from(ReferenceTableError::Validation(format!(
            "pricing.vat_country `{country}` has no VAT rates; quotes would fall back to `{}`",
            vat.fallback_country
        )));
        DoctorCheck::fail("vat_country", error.to_string(), error.exit_code())
    }
}

fn check_sample_quote(runtime: &PricingRuntime) -> DoctorCheck {
    let sample = ParsedInput {
        location: runtime.tables.labor.default_city.clone(),
        budget_preference: BudgetTier::Standard,
        room_type: "doctor_sample".to_string(),
        room_size: Decimal::TEN,
        tasks: vec![TaskKind::Painting],
        confidence_flags: BTreeSet::new(),
        complexity_factors: Vec::new(),
        vat_conditions: Default::default(),
    };

    match runtime.composer().compose(&sample) {
        Ok(quote) => DoctorCheck::pass(
            "sample_quote",
            format!("sample painting quote priced at {}", quote.pricing.summary.total_price),
        ),
        Err(error) => {
            let error = ApplicationError::from(error);
            DoctorCheck::fail("sample_quote", error.to_string(), error.exit_code())
        }
    }
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
