use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::cpq::rounding::{round_money, round_to};
use crate::domain::location::normalize_city;
use crate::domain::task::{ComplexityFactor, SkillLevel, TaskKind};
use crate::reference::LaborTable;

/// Rooms under this size (m²) take the `small_room` multiplier.
pub fn small_room_max_m2() -> Decimal {
    Decimal::new(5, 0)
}

/// Rooms over this size (m²) take the `large_room` multiplier.
pub fn large_room_min_m2() -> Decimal {
    Decimal::new(15, 0)
}

fn fallback_hours(room_size: Decimal) -> Decimal {
    Decimal::new(4, 0).max(room_size * Decimal::new(2, 0))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LaborCostBreakdown {
    pub task: TaskKind,
    pub city: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub labor_hours: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub hourly_rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_labor_cost: Decimal,
    pub skill_level_required: SkillLevel,
    pub complexity_factors: Vec<ComplexityFactor>,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_days: Decimal,
}

pub trait LaborCostProvider: Send + Sync {
    /// Hours of work, rounded to two decimals.
    fn labor_hours(
        &self,
        task: &TaskKind,
        room_size: Decimal,
        complexity_factors: &[ComplexityFactor],
    ) -> Decimal;

    fn skill_level(&self, task: &TaskKind) -> SkillLevel;

    fn hourly_rate(&self, city: &str, task: &TaskKind) -> Decimal;

    fn labor_cost(
        &self,
        task: &TaskKind,
        room_size: Decimal,
        city: &str,
        complexity_factors: &[ComplexityFactor],
    ) -> LaborCostBreakdown {
        let hours = self.labor_hours(task, room_size, complexity_factors);
        let hourly_rate = self.hourly_rate(city, task);

        LaborCostBreakdown {
            task: task.clone(),
            city: city.to_string(),
            labor_hours: hours,
            hourly_rate,
            total_labor_cost: round_money(hours * hourly_rate),
            skill_level_required: self.skill_level(task),
            complexity_factors: complexity_factors.to_vec(),
            estimated_days: estimated_days(hours),
        }
    }
}

impl<T: LaborCostProvider + ?Sized> LaborCostProvider for &T {
    fn labor_hours(
        &self,
        task: &TaskKind,
        room_size: Decimal,
        complexity_factors: &[ComplexityFactor],
    ) -> Decimal {
        (**self).labor_hours(task, room_size, complexity_factors)
    }

    fn skill_level(&self, task: &TaskKind) -> SkillLevel {
        (**self).skill_level(task)
    }

    fn hourly_rate(&self, city: &str, task: &TaskKind) -> Decimal {
        (**self).hourly_rate(city, task)
    }
}

/// Workdays for `hours` of labor, one decimal.
pub fn estimated_days(hours: Decimal) -> Decimal {
    round_to(hours / Decimal::new(8, 0), 1)
}

impl LaborCostProvider for LaborTable {
    fn labor_hours(
        &self,
        task: &TaskKind,
        room_size: Decimal,
        complexity_factors: &[ComplexityFactor],
    ) -> Decimal {
        let Some(entry) = self.tasks.get(task) else {
            debug!(
                event_name = "pricing.labor.fallback",
                task = %task,
                room_size = %room_size,
                "task has no labor table entry, using size-based fallback hours"
            );
            return round_to(fallback_hours(room_size), 2);
        };

        let mut hours =
            (entry.base_hours + entry.hours_per_m2 * room_size) * entry.difficulty_multiplier;

        // A factor listed twice still applies once.
        let distinct: BTreeSet<&ComplexityFactor> = complexity_factors.iter().collect();
        for factor in distinct {
            if let Some(multiplier) = self.complexity_multipliers.get(factor) {
                hours *= *multiplier;
            }
        }

        let room_factor = if room_size < small_room_max_m2() {
            self.complexity_multipliers.get(&ComplexityFactor::SmallRoom)
        } else if room_size > large_room_min_m2() {
            self.complexity_multipliers.get(&ComplexityFactor::LargeRoom)
        } else {
            None
        };
        if let Some(multiplier) = room_factor {
            hours *= *multiplier;
        }

        round_to(hours, 2)
    }

    fn skill_level(&self, task: &TaskKind) -> SkillLevel {
        self.tasks.get(task).map(|entry| entry.skill_level).unwrap_or_default()
    }

    fn hourly_rate(&self, city: &str, task: &TaskKind) -> Decimal {
        let normalized = normalize_city(city);
        let rates = match self.hourly_rates.get(&normalized) {
            Some(rates) => Some(rates),
            None => {
                debug!(
                    event_name = "pricing.labor.city_fallback",
                    city = %normalized,
                    default_city = %self.default_city,
                    "city has no labor rates, using default city"
                );
                self.hourly_rates.get(&self.default_city)
            }
        };

        // Validated tables always carry the default city.
        rates.map(|rates| rates.rate(self.skill_level(task))).unwrap_or(Decimal::ZERO)
    }
}
