use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::budget::PerTier;
use crate::domain::task::TaskKind;
use crate::reference::ReferenceTableError;

/// Material cost for one task at one budget tier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_per_m2: Option<Decimal>,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTable {
    /// Per-m² rate for tasks missing from `tasks`.
    #[serde(default = "default_fallback_rates")]
    pub fallback_rates: PerTier<Decimal>,
    #[serde(default = "default_fallback_items")]
    pub fallback_items: Vec<String>,
    pub tasks: BTreeMap<TaskKind, PerTier<MaterialRecord>>,
}

impl MaterialTable {
    pub fn tasks(&self) -> impl Iterator<Item = &TaskKind> {
        self.tasks.keys()
    }

    pub fn validate(&self) -> Result<(), ReferenceTableError> {
        for (tier, rate) in self.fallback_rates.iter() {
            if rate.is_sign_negative() {
                return Err(ReferenceTableError::Validation(format!(
                    "materials.fallback_rates.{tier} must not be negative"
                )));
            }
        }

        for (task, tiers) in &self.tasks {
            for (tier, record) in tiers.iter() {
                let negative = [record.base_cost, record.cost_per_m2]
                    .into_iter()
                    .flatten()
                    .any(|value| value.is_sign_negative());
                if negative {
                    return Err(ReferenceTableError::Validation(format!(
                        "materials.tasks.{task}.{tier} has a negative cost"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        let tasks = [
            (
                TaskKind::TileRemoval,
                PerTier {
                    budget_conscious: per_m2(1500, &["disposal bags", "protective sheets"]),
                    standard: per_m2(
                        2000,
                        &["disposal bags", "protective sheets", "cleaning supplies"],
                    ),
                    premium: per_m2(
                        2500,
                        &["eco-friendly disposal", "premium protection", "deep cleaning"],
                    ),
                },
            ),
            (
                TaskKind::Plumbing,
                PerTier {
                    budget_conscious: base_and_per_m2(
                        18000,
                        2500,
                        &["basic pipes", "standard fittings", "sealants"],
                    ),
                    standard: base_and_per_m2(
                        25000,
                        3500,
                        &["quality pipes", "standard fittings", "premium sealants", "shutoff valves"],
                    ),
                    premium: base_and_per_m2(
                        40000,
                        5000,
                        &["premium pipes", "brass fittings", "high-end fixtures", "smart shutoffs"],
                    ),
                },
            ),
            (
                TaskKind::ToiletReplacement,
                PerTier {
                    budget_conscious: base_only(
                        12000,
                        &["basic toilet", "wax ring", "bolts", "supply line"],
                    ),
                    standard: base_only(
                        28000,
                        &["mid-range toilet", "wax ring", "stainless bolts", "braided supply line"],
                    ),
                    premium: base_only(
                        65000,
                        &[
                            "high-end toilet",
                            "premium wax ring",
                            "brass bolts",
                            "premium supply line",
                            "bidet features",
                        ],
                    ),
                },
            ),
            (
                TaskKind::VanityInstallation,
                PerTier {
                    budget_conscious: base_and_per_m2(
                        20000,
                        1500,
                        &["basic vanity", "standard sink", "basic faucet", "mounting hardware"],
                    ),
                    standard: base_and_per_m2(
                        45000,
                        2500,
                        &[
                            "quality vanity",
                            "ceramic sink",
                            "mid-range faucet",
                            "quality hardware",
                            "mirror",
                        ],
                    ),
                    premium: base_and_per_m2(
                        90000,
                        4000,
                        &[
                            "custom vanity",
                            "designer sink",
                            "premium faucet",
                            "soft-close drawers",
                            "LED mirror",
                        ],
                    ),
                },
            ),
            (
                TaskKind::Painting,
                PerTier {
                    budget_conscious: per_m2(
                        800,
                        &["basic paint", "primer", "brushes", "drop cloths"],
                    ),
                    standard: per_m2(
                        1200,
                        &[
                            "quality paint",
                            "premium primer",
                            "quality brushes",
                            "painter tape",
                            "drop cloths",
                        ],
                    ),
                    premium: per_m2(
                        1800,
                        &[
                            "premium paint",
                            "high-end primer",
                            "professional brushes",
                            "specialty finishes",
                            "complete protection",
                        ],
                    ),
                },
            ),
            (
                TaskKind::FloorInstallation,
                PerTier {
                    budget_conscious: per_m2(
                        3500,
                        &["basic ceramic tiles", "standard adhesive", "basic grout", "spacers"],
                    ),
                    standard: per_m2(
                        5500,
                        &[
                            "quality ceramic tiles",
                            "premium adhesive",
                            "quality grout",
                            "leveling systems",
                            "sealer",
                        ],
                    ),
                    premium: per_m2(
                        8500,
                        &[
                            "designer tiles",
                            "premium adhesive",
                            "epoxy grout",
                            "leveling systems",
                            "premium sealer",
                            "trim pieces",
                        ],
                    ),
                },
            ),
            (
                TaskKind::GeneralRenovation,
                PerTier {
                    budget_conscious: per_m2(5000, &["basic materials", "standard supplies"]),
                    standard: per_m2(
                        8000,
                        &["quality materials", "complete supplies", "finishing materials"],
                    ),
                    premium: per_m2(
                        12000,
                        &["premium materials", "high-end supplies", "luxury finishes"],
                    ),
                },
            ),
        ];

        Self {
            fallback_rates: default_fallback_rates(),
            fallback_items: default_fallback_items(),
            tasks: tasks.into_iter().collect(),
        }
    }
}

fn default_fallback_rates() -> PerTier<Decimal> {
    PerTier {
        budget_conscious: Decimal::new(30, 0),
        standard: Decimal::new(50, 0),
        premium: Decimal::new(80, 0),
    }
}

fn default_fallback_items() -> Vec<String> {
    vec!["general supplies".to_string()]
}

fn items(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

// Amounts are in euro cents.
fn per_m2(cents: i64, names: &[&str]) -> MaterialRecord {
    MaterialRecord { base_cost: None, cost_per_m2: Some(Decimal::new(cents, 2)), items: items(names) }
}

fn base_only(cents: i64, names: &[&str]) -> MaterialRecord {
    MaterialRecord { base_cost: Some(Decimal::new(cents, 2)), cost_per_m2: None, items: items(names) }
}

fn base_and_per_m2(base_cents: i64, per_m2_cents: i64, names: &[&str]) -> MaterialRecord {
    MaterialRecord {
        base_cost: Some(Decimal::new(base_cents, 2)),
        cost_per_m2: Some(Decimal::new(per_m2_cents, 2)),
        items: items(names),
    }
}
