use renoquote_core::config::LoadOptions;
use renoquote_core::domain::location::Country;
use renoquote_core::domain::tax::VatConditions;

use crate::bootstrap::bootstrap;
use crate::commands::input::read_parsed_input;
use crate::commands::CommandResult;

const COMMAND: &str = "vat-summary";

/// Command-line adjustments layered over the input's own VAT conditions.
#[derive(Clone, Debug, Default)]
pub struct VatSummaryArgs {
    pub country: Option<String>,
    pub energy_efficiency: bool,
    pub accessibility: bool,
    pub building_age_years: Option<u32>,
}

impl VatSummaryArgs {
    fn apply(&self, mut conditions: VatConditions) -> VatConditions {
        conditions.energy_efficiency |= self.energy_efficiency;
        conditions.accessibility_improvements |= self.accessibility;
        if let Some(years) = self.building_age_years {
            conditions.building_age_years = Some(years);
        }
        conditions
    }
}

pub fn run(options: &LoadOptions, input: &str, args: &VatSummaryArgs) -> CommandResult {
    let runtime = match bootstrap(options) {
        Ok(runtime) => runtime,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let parsed = match read_parsed_input(input) {
        Ok(parsed) => parsed,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let country = args
        .country
        .as_deref()
        .map(Country::parse)
        .unwrap_or_else(|| runtime.config.pricing.vat_country.clone());
    let conditions = args.apply(parsed.vat_conditions.clone());

    match runtime.composer().vat_summary(&parsed, &country, &conditions) {
        Ok(summary) => CommandResult::document(COMMAND, &summary, true),
        Err(error) => CommandResult::from_error(COMMAND, &error.into()),
    }
}
