use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::location::Country;
use crate::domain::tax::VatCategory;
use crate::domain::task::TaskKind;
use crate::reference::ReferenceTableError;

/// VAT rates of one country. Only `standard` is mandatory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRates {
    pub standard: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduced: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_reduced: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero: Option<Decimal>,
}

impl CountryRates {
    pub fn get(&self, category: VatCategory) -> Option<Decimal> {
        match category {
            VatCategory::Standard => Some(self.standard),
            VatCategory::Reduced => self.reduced,
            VatCategory::SuperReduced => self.super_reduced,
            VatCategory::Zero => self.zero,
        }
    }

    pub fn defined(&self) -> impl Iterator<Item = (VatCategory, Decimal)> + '_ {
        VatCategory::ALL.into_iter().filter_map(|category| Some((category, self.get(category)?)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatTable {
    /// Country used when the requested one has no rate table.
    #[serde(default)]
    pub fallback_country: Country,
    /// Buildings older than this (in years) qualify for the French renovation rate.
    #[serde(default = "default_renovation_age_years")]
    pub renovation_age_years: u32,
    pub rates: BTreeMap<Country, CountryRates>,
    pub task_categories: BTreeMap<TaskKind, BTreeMap<Country, VatCategory>>,
    #[serde(default)]
    pub energy_certification: BTreeMap<Country, VatCategory>,
    #[serde(default)]
    pub accessibility_improvements: BTreeMap<Country, VatCategory>,
}

impl VatTable {
    pub fn validate(&self) -> Result<(), ReferenceTableError> {
        if !self.rates.contains_key(&self.fallback_country) {
            return Err(ReferenceTableError::Validation(format!(
                "vat.fallback_country `{}` has no entry in vat.rates",
                self.fallback_country
            )));
        }

        for (country, rates) in &self.rates {
            for (category, rate) in rates.defined() {
                if rate.is_sign_negative() || rate >= Decimal::ONE {
                    return Err(ReferenceTableError::Validation(format!(
                        "vat.rates.{country}.{} must be in range 0..1",
                        category.as_str()
                    )));
                }
            }
        }

        if let Some(france) = self.rates.get(&Country::France) {
            if france.reduced.is_none() {
                return Err(ReferenceTableError::Validation(
                    "vat.rates.france must define `reduced` for the renovation age rule"
                        .to_string(),
                ));
            }
        }

        for (task, by_country) in &self.task_categories {
            for (country, category) in by_country {
                self.ensure_category(&format!("vat.task_categories.{task}.{country}"), country, *category)?;
            }
        }
        for (country, category) in &self.energy_certification {
            self.ensure_category(&format!("vat.energy_certification.{country}"), country, *category)?;
        }
        for (country, category) in &self.accessibility_improvements {
            self.ensure_category(
                &format!("vat.accessibility_improvements.{country}"),
                country,
                *category,
            )?;
        }

        Ok(())
    }

    fn ensure_category(
        &self,
        key: &str,
        country: &Country,
        category: VatCategory,
    ) -> Result<(), ReferenceTableError> {
        let Some(rates) = self.rates.get(country) else {
            return Err(ReferenceTableError::Validation(format!(
                "{key} references country `{country}` missing from vat.rates"
            )));
        };
        if rates.get(category).is_none() {
            return Err(ReferenceTableError::Validation(format!(
                "{key} uses category `{}` which vat.rates.{country} does not define",
                category.as_str()
            )));
        }
        Ok(())
    }
}

impl Default for VatTable {
    fn default() -> Self {
        use VatCategory::{Reduced, Standard, SuperReduced};

        let rates = [
            (Country::France, country_rates(200, Some(100), Some(55))),
            (Country::Germany, country_rates(190, Some(70), None)),
            (Country::Spain, country_rates(210, Some(100), Some(40))),
            (Country::Italy, country_rates(220, Some(100), Some(40))),
        ];

        let task_categories = [
            (TaskKind::TileRemoval, by_country(Reduced, Standard, Reduced, Reduced)),
            (TaskKind::Plumbing, by_country(Reduced, Standard, Reduced, Reduced)),
            (TaskKind::ToiletReplacement, by_country(Standard, Standard, Standard, Standard)),
            (TaskKind::VanityInstallation, by_country(Standard, Standard, Standard, Standard)),
            (TaskKind::Painting, by_country(Reduced, Standard, Reduced, Reduced)),
            (TaskKind::FloorInstallation, by_country(Reduced, Standard, Reduced, Reduced)),
            (TaskKind::GeneralRenovation, by_country(Reduced, Standard, Reduced, Reduced)),
            (
                TaskKind::EnergyEfficiency,
                by_country(SuperReduced, Reduced, SuperReduced, SuperReduced),
            ),
        ];

        Self {
            fallback_country: Country::France,
            renovation_age_years: default_renovation_age_years(),
            rates: rates.into_iter().collect(),
            task_categories: task_categories.into_iter().collect(),
            energy_certification: by_country(SuperReduced, Reduced, SuperReduced, SuperReduced),
            accessibility_improvements: by_country(
                SuperReduced,
                Reduced,
                SuperReduced,
                SuperReduced,
            ),
        }
    }
}

fn default_renovation_age_years() -> u32 {
    2
}

// Rates are given in tenths of a percent.
fn country_rates(standard: i64, reduced: Option<i64>, super_reduced: Option<i64>) -> CountryRates {
    CountryRates {
        standard: Decimal::new(standard, 3),
        reduced: reduced.map(|value| Decimal::new(value, 3)),
        super_reduced: super_reduced.map(|value| Decimal::new(value, 3)),
        zero: Some(Decimal::ZERO),
    }
}

fn by_country(
    france: VatCategory,
    germany: VatCategory,
    spain: VatCategory,
    italy: VatCategory,
) -> BTreeMap<Country, VatCategory> {
    [
        (Country::France, france),
        (Country::Germany, germany),
        (Country::Spain, spain),
        (Country::Italy, italy),
    ]
    .into_iter()
    .collect()
}
