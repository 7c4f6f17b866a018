use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::domain::budget::BudgetTier;
use crate::domain::tax::VatCategory;
use crate::domain::task::{SkillLevel, TaskKind};

/// Priced breakdown of one task. Monetary fields are rounded to cents and
/// rates to three decimals; `total_price` already includes the city multiplier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TaskPricing {
    pub task_name: TaskKind,
    #[serde(with = "rust_decimal::serde::float")]
    pub materials_cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_hours: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_cost: Decimal,
    pub skill_level: SkillLevel,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub margin_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub margin_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_rate: Decimal,
    pub vat_category: VatCategory,
    #[serde(with = "rust_decimal::serde::float")]
    pub vat_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub city_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_duration_days: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub location: String,
    pub budget_preference: BudgetTier,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectDetails {
    pub zone: String,
    #[serde(rename = "room_size_m2", with = "rust_decimal::serde::float")]
    pub room_size: Decimal,
    #[serde(rename = "tasks_identified")]
    pub tasks: Vec<TaskKind>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ZonePricing {
    /// Serialized as a `task -> pricing` object in input order.
    #[serde(serialize_with = "serialize_task_map")]
    pub tasks: Vec<TaskPricing>,
    #[serde(with = "rust_decimal::serde::float")]
    pub zone_total: Decimal,
}

impl ZonePricing {
    pub fn task(&self, task: &TaskKind) -> Option<&TaskPricing> {
        self.tasks.iter().find(|pricing| &pricing.task_name == task)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PricingSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_materials: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_labor: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal_before_vat: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_vat: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub city_multiplier: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub average_margin: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuotePricing {
    pub zones: BTreeMap<String, ZonePricing>,
    pub summary: PricingSummary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub client_info: ClientInfo,
    pub project_details: ProjectDetails,
    pub pricing: QuotePricing,
    #[serde(with = "rust_decimal::serde::float")]
    pub confidence_score: Decimal,
    pub confidence_flags: BTreeSet<String>,
}

impl Quote {
    pub fn zone(&self) -> Option<&ZonePricing> {
        self.pricing.zones.get(&self.project_details.zone)
    }
}

fn serialize_task_map<S>(tasks: &[TaskPricing], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(tasks.len()))?;
    for pricing in tasks {
        map.serialize_entry(pricing.task_name.as_str(), pricing)?;
    }
    map.end()
}
