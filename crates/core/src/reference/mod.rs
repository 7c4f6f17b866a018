//! Immutable reference data consumed by the pricing providers.
//!
//! Tables are built once (built-in defaults or a TOML file), validated, and
//! then shared by reference for the lifetime of the process. A TOML file may
//! define any subset of `materials`, `labor`, `vat` and `cities`; omitted
//! sections keep their built-in values.

pub mod cities;
pub mod labor;
pub mod materials;
pub mod vat;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub use self::cities::CityTable;
pub use self::labor::{LaborTable, LaborTask, SkillRates};
pub use self::materials::{MaterialRecord, MaterialTable};
pub use self::vat::{CountryRates, VatTable};

#[derive(Debug, Error)]
pub enum ReferenceTableError {
    #[error("could not read reference tables `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse reference tables `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("could not parse reference tables: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("reference table validation failed: {0}")]
    Validation(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceTables {
    pub materials: MaterialTable,
    pub labor: LaborTable,
    pub vat: VatTable,
    pub cities: CityTable,
}

impl ReferenceTables {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Built-in tables when `path` is `None`, otherwise the file at `path`.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ReferenceTableError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let tables = Self::builtin();
                tables.validate()?;
                Ok(tables)
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, ReferenceTableError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| ReferenceTableError::ReadFile { path: path.to_path_buf(), source })?;
        let tables = toml::from_str::<Self>(&raw)
            .map_err(|source| ReferenceTableError::ParseFile { path: path.to_path_buf(), source })?;
        tables.validate()?;

        info!(
            event_name = "reference.tables.loaded",
            path = %path.display(),
            material_tasks = tables.materials.tasks.len(),
            labor_tasks = tables.labor.tasks.len(),
            vat_countries = tables.vat.rates.len(),
            cities = tables.cities.multipliers.len(),
            "reference tables loaded"
        );
        Ok(tables)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ReferenceTableError> {
        let tables = toml::from_str::<Self>(raw)?;
        tables.validate()?;
        Ok(tables)
    }

    pub fn validate(&self) -> Result<(), ReferenceTableError> {
        self.materials.validate()?;
        self.labor.validate()?;
        self.vat.validate()?;
        self.cities.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{ReferenceTableError, ReferenceTables};
    use crate::domain::location::Country;
    use crate::domain::task::{ComplexityFactor, TaskKind};

    #[test]
    fn builtin_tables_pass_validation() {
        let tables = ReferenceTables::builtin();
        tables.validate().expect("builtin tables should be valid");

        assert_eq!(tables.materials.tasks.len(), 7);
        assert_eq!(tables.labor.tasks.len(), 7);
        assert_eq!(tables.labor.hourly_rates.len(), 7);
        assert_eq!(tables.vat.rates.len(), 4);
        assert_eq!(tables.vat.task_categories.len(), 8);
        assert_eq!(tables.cities.multipliers.len(), 7);
    }

    #[test]
    fn partial_file_keeps_builtin_sections() {
        let tables = ReferenceTables::from_toml_str(
            r#"
[cities]
paris = 1.30
lille = 1.05
"#,
        )
        .expect("partial tables should load");

        assert_eq!(tables.cities.get("Paris"), Some(Decimal::new(130, 2)));
        assert_eq!(tables.cities.get("lille"), Some(Decimal::new(105, 2)));
        assert_eq!(tables.cities.get("lyon"), None);
        assert_eq!(tables.labor, ReferenceTables::builtin().labor);
    }

    #[test]
    fn custom_task_keys_parse_as_unrecognized_tasks() {
        let tables = ReferenceTables::from_toml_str(
            r#"
[materials]
[materials.tasks.sauna_installation.budget_conscious]
base_cost = 1500.0
[materials.tasks.sauna_installation.standard]
base_cost = 2500.0
items = ["cedar panels"]
[materials.tasks.sauna_installation.premium]
base_cost = 4000.0
"#,
        )
        .expect("custom material table should load");

        let task = TaskKind::Unrecognized("sauna_installation".to_string());
        assert!(tables.materials.tasks.contains_key(&task));
        assert_eq!(tables.materials.tasks.len(), 1);
    }

    #[test]
    fn missing_tier_is_a_load_error() {
        let error = ReferenceTables::from_toml_str(
            r#"
[materials.tasks.painting.standard]
cost_per_m2 = 12.0
"#,
        )
        .expect_err("missing tiers must be rejected");

        assert!(matches!(error, ReferenceTableError::Parse(_)));
    }

    #[test]
    fn default_city_must_have_rates() {
        let mut tables = ReferenceTables::builtin();
        tables.labor.default_city = "lille".to_string();

        let error = tables.validate().expect_err("unknown default city must be rejected");
        assert!(error.to_string().contains("labor.default_city"));
    }

    #[test]
    fn room_size_multipliers_are_required() {
        let mut tables = ReferenceTables::builtin();
        tables.labor.complexity_multipliers.remove(&ComplexityFactor::LargeRoom);

        let error = tables.validate().expect_err("missing large_room must be rejected");
        assert!(error.to_string().contains("large_room"));
    }

    #[test]
    fn vat_category_must_exist_for_country() {
        let mut tables = ReferenceTables::builtin();
        if let Some(germany) = tables.vat.rates.get_mut(&Country::Germany) {
            germany.reduced = None;
        }

        let error = tables.validate().expect_err("germany reduced category is referenced");
        assert!(error.to_string().contains("germany"));
    }

    #[test]
    fn uppercase_city_keys_are_rejected() {
        let mut tables = ReferenceTables::builtin();
        tables.cities.multipliers.insert("Lille".to_string(), Decimal::ONE);

        assert!(tables.validate().is_err());
    }

    #[test]
    fn load_reports_path_on_parse_failure() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("tables.toml");
        fs::write(&path, "[cities]\nparis = \"expensive\"\n").expect("write tables");

        let error = ReferenceTables::load(&path).expect_err("string multiplier must fail");
        assert!(matches!(error, ReferenceTableError::ParseFile { .. }));
        assert!(error.to_string().contains("tables.toml"));
    }

    #[test]
    fn resolve_without_path_uses_builtin_tables() {
        let tables = ReferenceTables::resolve(None).expect("builtin tables");
        assert_eq!(tables, ReferenceTables::builtin());
    }
}
