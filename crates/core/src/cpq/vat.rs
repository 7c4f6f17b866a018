use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cpq::rounding::{round_money, round_rate, round_to};
use crate::domain::location::Country;
use crate::domain::tax::{VatCategory, VatConditions};
use crate::domain::task::TaskKind;
use crate::reference::VatTable;

/// Outcome of a VAT lookup: the country whose rates applied, the category,
/// and its rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VatResolution {
    pub country: Country,
    pub category: VatCategory,
    pub rate: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VatBreakdown {
    pub task: TaskKind,
    pub country: Country,
    pub vat_category: VatCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
}

/// Tasks that share one VAT rate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VatGroup {
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_amount: Decimal,
    pub tasks: Vec<TaskKind>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VatSummary {
    pub country: Country,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_base_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_vat_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_with_vat: Decimal,
    /// Ordered by ascending rate.
    pub vat_groups: Vec<VatGroup>,
    pub task_breakdown: Vec<VatBreakdown>,
    pub conditions_applied: VatConditions,
}

pub trait VatRateProvider: Send + Sync {
    fn resolve(&self, task: &TaskKind, country: &Country, conditions: &VatConditions)
        -> VatResolution;

    fn vat_rate(&self, task: &TaskKind, country: &Country, conditions: &VatConditions) -> Decimal {
        self.resolve(task, country, conditions).rate
    }

    fn calculate_vat_amount(
        &self,
        base_amount: Decimal,
        task: &TaskKind,
        country: &Country,
        conditions: &VatConditions,
    ) -> VatBreakdown {
        let resolution = self.resolve(task, country, conditions);
        let vat_amount = base_amount * resolution.rate;

        VatBreakdown {
            task: task.clone(),
            country: resolution.country,
            vat_category: resolution.category,
            base_amount: round_money(base_amount),
            vat_rate: round_rate(resolution.rate),
            vat_percentage: percentage(resolution.rate),
            vat_amount: round_money(vat_amount),
            total_amount: round_money(base_amount + vat_amount),
        }
    }

    fn vat_summary_by_tasks(
        &self,
        task_amounts: &[(TaskKind, Decimal)],
        country: &Country,
        conditions: &VatConditions,
    ) -> VatSummary {
        let mut resolved_country = country.clone();
        let mut total_base = Decimal::ZERO;
        let mut total_vat = Decimal::ZERO;
        let mut groups: BTreeMap<Decimal, VatGroup> = BTreeMap::new();
        let mut task_breakdown = Vec::with_capacity(task_amounts.len());

        for (task, base_amount) in task_amounts {
            let resolution = self.resolve(task, country, conditions);
            let vat_amount = *base_amount * resolution.rate;
            total_base += *base_amount;
            total_vat += vat_amount;

            let group = groups.entry(resolution.rate).or_insert_with(|| VatGroup {
                vat_rate: round_rate(resolution.rate),
                vat_percentage: percentage(resolution.rate),
                base_amount: Decimal::ZERO,
                vat_amount: Decimal::ZERO,
                tasks: Vec::new(),
            });
            group.base_amount += *base_amount;
            group.vat_amount += vat_amount;
            group.tasks.push(task.clone());

            resolved_country = resolution.country.clone();
            task_breakdown.push(self.calculate_vat_amount(*base_amount, task, country, conditions));
        }

        let vat_groups = groups
            .into_values()
            .map(|group| VatGroup {
                base_amount: round_money(group.base_amount),
                vat_amount: round_money(group.vat_amount),
                ..group
            })
            .collect();

        VatSummary {
            country: resolved_country,
            total_base_amount: round_money(total_base),
            total_vat_amount: round_money(total_vat),
            total_with_vat: round_money(total_base + total_vat),
            vat_groups,
            task_breakdown,
            conditions_applied: conditions.clone(),
        }
    }
}

impl<T: VatRateProvider + ?Sized> VatRateProvider for &T {
    fn resolve(
        &self,
        task: &TaskKind,
        country: &Country,
        conditions: &VatConditions,
    ) -> VatResolution {
        (**self).resolve(task, country, conditions)
    }
}

fn percentage(rate: Decimal) -> Decimal {
    round_to(rate * Decimal::ONE_HUNDRED, 1)
}

impl VatTable {
    fn resolve_country(&self, country: &Country) -> Country {
        if self.rates.contains_key(country) {
            return country.clone();
        }
        debug!(
            event_name = "pricing.vat.country_fallback",
            country = %country,
            fallback_country = %self.fallback_country,
            "country has no VAT rates, using fallback country"
        );
        self.fallback_country.clone()
    }

    fn base_category(&self, task: &TaskKind, country: &Country) -> VatCategory {
        self.task_categories
            .get(task)
            .and_then(|by_country| by_country.get(country))
            .copied()
            .unwrap_or(VatCategory::Standard)
    }

    fn apply_conditions(
        &self,
        base: VatCategory,
        country: &Country,
        conditions: &VatConditions,
    ) -> VatCategory {
        if conditions.energy_efficiency {
            return self.energy_certification.get(country).copied().unwrap_or(base);
        }

        if conditions.accessibility_improvements {
            return self.accessibility_improvements.get(country).copied().unwrap_or(base);
        }

        let old_building = conditions
            .building_age_years
            .is_some_and(|years| years > self.renovation_age_years);
        if *country == Country::France && old_building && base == VatCategory::Standard {
            return VatCategory::Reduced;
        }

        base
    }
}

impl VatRateProvider for VatTable {
    fn resolve(
        &self,
        task: &TaskKind,
        country: &Country,
        conditions: &VatConditions,
    ) -> VatResolution {
        let country = self.resolve_country(country);
        let base = self.base_category(task, &country);
        let category = self.apply_conditions(base, &country, conditions);

        let Some(rates) = self.rates.get(&country) else {
            warn!(
                event_name = "pricing.vat.missing_rates",
                country = %country,
                "no VAT rates for resolved country; tables were not validated"
            );
            return VatResolution { country, category, rate: Decimal::ZERO };
        };

        match rates.get(category) {
            Some(rate) => VatResolution { country, category, rate },
            None => {
                warn!(
                    event_name = "pricing.vat.missing_category",
                    country = %country,
                    category = category.as_str(),
                    "VAT category undefined for country, using standard rate"
                );
                VatResolution { country, category: VatCategory::Standard, rate: rates.standard }
            }
        }
    }
}
