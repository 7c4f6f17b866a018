use std::collections::BTreeSet;

use renoquote_core::config::LoadOptions;
use renoquote_core::cpq::{LaborCostProvider, MaterialCostProvider, VatRateProvider};
use renoquote_core::domain::budget::{BudgetTier, PerTier};
use renoquote_core::domain::location::Country;
use renoquote_core::domain::tax::{VatCategory, VatConditions};
use renoquote_core::domain::task::{SkillLevel, TaskKind};
use renoquote_core::reference::ReferenceTables;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::bootstrap::bootstrap;
use crate::commands::CommandResult;

const COMMAND: &str = "tables";

#[derive(Debug, Serialize)]
struct TaskRow {
    task: TaskKind,
    skill_level: SkillLevel,
    vat_category: VatCategory,
    materials: PerTier<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct CityRow {
    city: String,
    #[serde(with = "rust_decimal::serde::float")]
    multiplier: Decimal,
}

#[derive(Debug, Serialize)]
struct TablesReport {
    vat_country: Country,
    default_city: String,
    tasks: Vec<TaskRow>,
    cities: Vec<CityRow>,
}

pub fn run(options: &LoadOptions) -> CommandResult {
    match bootstrap(options) {
        Ok(runtime) => {
            let report = build_report(&runtime.tables, &runtime.config.pricing.vat_country);
            CommandResult::document(COMMAND, &report, true)
        }
        Err(error) => CommandResult::from_error(COMMAND, &error),
    }
}

fn build_report(tables: &ReferenceTables, vat_country: &Country) -> TablesReport {
    let known: BTreeSet<TaskKind> = tables
        .materials
        .known_tasks()
        .into_iter()
        .chain(tables.labor.tasks.keys().cloned())
        .chain(tables.vat.task_categories.keys().cloned())
        .collect();

    let no_conditions = VatConditions::default();
    let tasks = known
        .into_iter()
        .map(|task| {
            let materials = PerTier {
                budget_conscious: tables
                    .materials
                    .material_list(&task, &BudgetTier::BudgetConscious),
                standard: tables.materials.material_list(&task, &BudgetTier::Standard),
                premium: tables.materials.material_list(&task, &BudgetTier::Premium),
            };
            TaskRow {
                skill_level: tables.labor.skill_level(&task),
                vat_category: tables.vat.resolve(&task, vat_country, &no_conditions).category,
                materials,
                task,
            }
        })
        .collect();

    let cities = tables
        .cities
        .multipliers
        .iter()
        .map(|(city, multiplier)| CityRow { city: city.clone(), multiplier: *multiplier })
        .collect();

    TablesReport {
        vat_country: vat_country.clone(),
        default_city: tables.labor.default_city.clone(),
        tasks,
        cities,
    }
}

#[cfg(test)]
mod tests {
    use renoquote_core::domain::location::Country;
    use renoquote_core::domain::tax::VatCategory;
    use renoquote_core::domain::task::{SkillLevel, TaskKind};
    use renoquote_core::reference::ReferenceTables;

    use super::build_report;

    #[test]
    fn report_merges_task_keys_across_tables() {
        let tables = ReferenceTables::builtin();
        let report = build_report(&tables, &Country::France);

        // energy_efficiency only has a VAT category
        assert_eq!(report.tasks.len(), 8);
        assert_eq!(report.cities.len(), 7);
        assert_eq!(report.default_city, "marseille");

        let energy = report
            .tasks
            .iter()
            .find(|row| row.task == TaskKind::EnergyEfficiency)
            .expect("energy efficiency row");
        assert_eq!(energy.vat_category, VatCategory::SuperReduced);
        assert_eq!(energy.skill_level, SkillLevel::General);
        assert_eq!(energy.materials.standard, vec!["general supplies".to_string()]);
    }
}
