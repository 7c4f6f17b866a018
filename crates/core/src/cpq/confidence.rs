//! Confidence heuristic for generated quotes.
//!
//! The score starts at 1.0 and each [`ConfidenceRule`] contributes one signed
//! adjustment. Rules are independent so they can be tuned or tested alone.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::cpq::rounding::round_to;

/// Facts about a request that the rules score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfidenceContext {
    pub flag_count: usize,
    pub task_count: usize,
    pub room_size: Decimal,
    pub known_city: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ConfidenceRule {
    /// Subtract `per_flag` for every parser uncertainty flag.
    FlagPenalty { per_flag: Decimal },
    /// Subtract `penalty` when fewer than `min_tasks` tasks were identified.
    MinimumTaskCount { min_tasks: usize, penalty: Decimal },
    /// Subtract `penalty` when the room size falls outside `[min_m2, max_m2]`.
    RoomSizeBounds { min_m2: Decimal, max_m2: Decimal, penalty: Decimal },
    /// Add `bonus` when the location is a known city.
    KnownCityBonus { bonus: Decimal },
}

impl ConfidenceRule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FlagPenalty { .. } => "flag_penalty",
            Self::MinimumTaskCount { .. } => "minimum_task_count",
            Self::RoomSizeBounds { .. } => "room_size_bounds",
            Self::KnownCityBonus { .. } => "known_city_bonus",
        }
    }

    pub fn adjustment(&self, context: &ConfidenceContext) -> Decimal {
        match self {
            Self::FlagPenalty { per_flag } => -(*per_flag * Decimal::from(context.flag_count)),
            Self::MinimumTaskCount { min_tasks, penalty } => {
                if context.task_count < *min_tasks {
                    -*penalty
                } else {
                    Decimal::ZERO
                }
            }
            Self::RoomSizeBounds { min_m2, max_m2, penalty } => {
                if context.room_size < *min_m2 || context.room_size > *max_m2 {
                    -*penalty
                } else {
                    Decimal::ZERO
                }
            }
            Self::KnownCityBonus { bonus } => {
                if context.known_city {
                    *bonus
                } else {
                    Decimal::ZERO
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfidencePolicy {
    rules: Vec<ConfidenceRule>,
}

impl ConfidencePolicy {
    pub fn new(rules: Vec<ConfidenceRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ConfidenceRule] {
        &self.rules
    }

    /// Non-zero adjustments keyed by rule name, in rule order.
    pub fn adjustments(&self, context: &ConfidenceContext) -> Vec<(&'static str, Decimal)> {
        self.rules
            .iter()
            .map(|rule| (rule.name(), rule.adjustment(context)))
            .filter(|(_, adjustment)| !adjustment.is_zero())
            .collect()
    }

    /// Score in `[0, 1]`, two decimals.
    pub fn score(&self, context: &ConfidenceContext) -> Decimal {
        let raw = self
            .rules
            .iter()
            .fold(Decimal::ONE, |score, rule| score + rule.adjustment(context));
        round_to(raw.clamp(Decimal::ZERO, Decimal::ONE), 2)
    }
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self::new(vec![
            ConfidenceRule::FlagPenalty { per_flag: Decimal::new(1, 1) },
            ConfidenceRule::MinimumTaskCount { min_tasks: 3, penalty: Decimal::new(1, 1) },
            ConfidenceRule::RoomSizeBounds {
                min_m2: Decimal::new(2, 0),
                max_m2: Decimal::new(30, 0),
                penalty: Decimal::new(15, 2),
            },
            ConfidenceRule::KnownCityBonus { bonus: Decimal::new(5, 2) },
        ])
    }
}
