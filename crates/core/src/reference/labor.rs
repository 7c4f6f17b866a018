use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::location::normalize_city;
use crate::domain::task::{ComplexityFactor, SkillLevel, TaskKind};
use crate::reference::ReferenceTableError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborTask {
    pub base_hours: Decimal,
    pub hours_per_m2: Decimal,
    pub difficulty_multiplier: Decimal,
    #[serde(default)]
    pub skill_level: SkillLevel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRates {
    pub general: Decimal,
    pub specialized: Decimal,
    pub expert: Decimal,
}

impl SkillRates {
    pub fn rate(&self, skill: SkillLevel) -> Decimal {
        match skill {
            SkillLevel::General => self.general,
            SkillLevel::Specialized => self.specialized,
            SkillLevel::Expert => self.expert,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborTable {
    /// City whose rates apply when the quoted city has no rate table.
    pub default_city: String,
    pub tasks: BTreeMap<TaskKind, LaborTask>,
    pub hourly_rates: BTreeMap<String, SkillRates>,
    pub complexity_multipliers: BTreeMap<ComplexityFactor, Decimal>,
}

impl LaborTable {
    pub fn validate(&self) -> Result<(), ReferenceTableError> {
        for city in self.hourly_rates.keys() {
            if *city != normalize_city(city) {
                return Err(ReferenceTableError::Validation(format!(
                    "labor.hourly_rates key `{city}` must be a lowercase city name"
                )));
            }
        }

        if !self.hourly_rates.contains_key(&self.default_city) {
            return Err(ReferenceTableError::Validation(format!(
                "labor.default_city `{}` has no entry in labor.hourly_rates",
                self.default_city
            )));
        }

        for (city, rates) in &self.hourly_rates {
            if [rates.general, rates.specialized, rates.expert]
                .iter()
                .any(|rate| *rate <= Decimal::ZERO)
            {
                return Err(ReferenceTableError::Validation(format!(
                    "labor.hourly_rates.{city} rates must be greater than zero"
                )));
            }
        }

        for (task, entry) in &self.tasks {
            if entry.base_hours.is_sign_negative() || entry.hours_per_m2.is_sign_negative() {
                return Err(ReferenceTableError::Validation(format!(
                    "labor.tasks.{task} hours must not be negative"
                )));
            }
            if entry.difficulty_multiplier <= Decimal::ZERO {
                return Err(ReferenceTableError::Validation(format!(
                    "labor.tasks.{task}.difficulty_multiplier must be greater than zero"
                )));
            }
        }

        for required in [ComplexityFactor::SmallRoom, ComplexityFactor::LargeRoom] {
            if !self.complexity_multipliers.contains_key(&required) {
                return Err(ReferenceTableError::Validation(format!(
                    "labor.complexity_multipliers must define `{required}`"
                )));
            }
        }

        for (factor, multiplier) in &self.complexity_multipliers {
            if *multiplier <= Decimal::ZERO {
                return Err(ReferenceTableError::Validation(format!(
                    "labor.complexity_multipliers.{factor} must be greater than zero"
                )));
            }
        }

        Ok(())
    }
}

impl Default for LaborTable {
    fn default() -> Self {
        let tasks = [
            (TaskKind::TileRemoval, task(20, 15, 10, SkillLevel::General)),
            (TaskKind::Plumbing, task(40, 25, 14, SkillLevel::Specialized)),
            (TaskKind::ToiletReplacement, task(30, 0, 11, SkillLevel::General)),
            (TaskKind::VanityInstallation, task(40, 10, 12, SkillLevel::General)),
            (TaskKind::Painting, task(10, 8, 9, SkillLevel::General)),
            (TaskKind::FloorInstallation, task(30, 20, 13, SkillLevel::Specialized)),
            (TaskKind::GeneralRenovation, task(80, 30, 10, SkillLevel::General)),
        ];

        let hourly_rates = [
            ("paris", rates(45, 65, 85)),
            ("marseille", rates(35, 50, 70)),
            ("lyon", rates(40, 58, 78)),
            ("toulouse", rates(32, 46, 65)),
            ("nice", rates(42, 60, 80)),
            ("nantes", rates(38, 54, 74)),
            ("bordeaux", rates(39, 56, 76)),
        ];

        let complexity_multipliers = [
            (ComplexityFactor::SmallRoom, Decimal::new(110, 2)),
            (ComplexityFactor::StandardRoom, Decimal::new(100, 2)),
            (ComplexityFactor::LargeRoom, Decimal::new(95, 2)),
            (ComplexityFactor::DifficultAccess, Decimal::new(130, 2)),
            (ComplexityFactor::OldBuilding, Decimal::new(120, 2)),
            (ComplexityFactor::NewConstruction, Decimal::new(90, 2)),
        ];

        Self {
            default_city: "marseille".to_string(),
            tasks: tasks.into_iter().collect(),
            hourly_rates: hourly_rates
                .into_iter()
                .map(|(city, rates)| (city.to_string(), rates))
                .collect(),
            complexity_multipliers: complexity_multipliers.into_iter().collect(),
        }
    }
}

// Hours and multipliers are given in tenths.
fn task(base_tenths: i64, per_m2_tenths: i64, difficulty_tenths: i64, skill: SkillLevel) -> LaborTask {
    LaborTask {
        base_hours: Decimal::new(base_tenths, 1),
        hours_per_m2: Decimal::new(per_m2_tenths, 1),
        difficulty_multiplier: Decimal::new(difficulty_tenths, 1),
        skill_level: skill,
    }
}

fn rates(general: i64, specialized: i64, expert: i64) -> SkillRates {
    SkillRates {
        general: Decimal::new(general, 0),
        specialized: Decimal::new(specialized, 0),
        expert: Decimal::new(expert, 0),
    }
}
