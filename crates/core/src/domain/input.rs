use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::budget::BudgetTier;
use crate::domain::tax::VatConditions;
use crate::domain::task::{ComplexityFactor, TaskKind};
use crate::errors::DomainError;

/// Largest room size (m²) accepted for pricing.
pub fn max_room_size_m2() -> Decimal {
    Decimal::new(100_000, 0)
}

/// Structured project description handed over by the transcript parser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInput {
    pub location: String,
    #[serde(default)]
    pub budget_preference: BudgetTier,
    pub room_type: String,
    pub room_size: Decimal,
    #[serde(default)]
    pub tasks: Vec<TaskKind>,
    #[serde(default)]
    pub confidence_flags: BTreeSet<String>,
    #[serde(default)]
    pub complexity_factors: Vec<ComplexityFactor>,
    #[serde(default)]
    pub vat_conditions: VatConditions,
}

impl ParsedInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.room_size <= Decimal::ZERO {
            return Err(DomainError::InvalidRoomSize { room_size: self.room_size });
        }
        if self.room_size > max_room_size_m2() {
            return Err(DomainError::RoomSizeTooLarge {
                room_size: self.room_size,
                max: max_room_size_m2(),
            });
        }
        Ok(())
    }

    /// Tasks in input order with repeats dropped.
    pub fn distinct_tasks(&self) -> Vec<TaskKind> {
        let mut seen = BTreeSet::new();
        self.tasks.iter().filter(|task| seen.insert((*task).clone())).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{max_room_size_m2, ParsedInput};
    use crate::domain::budget::BudgetTier;
    use crate::domain::task::TaskKind;
    use crate::errors::DomainError;

    fn input(room_size: Decimal) -> ParsedInput {
        ParsedInput {
            location: "paris".to_string(),
            budget_preference: BudgetTier::Standard,
            room_type: "bathroom".to_string(),
            room_size,
            tasks: vec![TaskKind::Painting, TaskKind::Plumbing, TaskKind::Painting],
            confidence_flags: Default::default(),
            complexity_factors: Vec::new(),
            vat_conditions: Default::default(),
        }
    }

    #[test]
    fn rejects_non_positive_room_size() {
        assert!(matches!(
            input(Decimal::ZERO).validate(),
            Err(DomainError::InvalidRoomSize { .. })
        ));
        assert!(input(Decimal::new(-3, 0)).validate().is_err());
        assert!(input(Decimal::new(45, 1)).validate().is_ok());
    }

    #[test]
    fn rejects_room_size_above_ceiling() {
        assert!(input(max_room_size_m2()).validate().is_ok());
        assert_eq!(
            input(Decimal::from(5_000_000_000_u64)).validate(),
            Err(DomainError::RoomSizeTooLarge {
                room_size: Decimal::from(5_000_000_000_u64),
                max: max_room_size_m2(),
            })
        );
    }

    #[test]
    fn distinct_tasks_keep_first_occurrence_order() {
        assert_eq!(
            input(Decimal::TEN).distinct_tasks(),
            vec![TaskKind::Painting, TaskKind::Plumbing]
        );
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let parsed: ParsedInput = serde_json::from_str(
            r#"{"location":"lyon","room_type":"kitchen","room_size":12.5,"tasks":["painting"]}"#,
        )
        .expect("parse input");

        assert_eq!(parsed.budget_preference, BudgetTier::Standard);
        assert_eq!(parsed.room_size, Decimal::new(125, 1));
        assert!(parsed.confidence_flags.is_empty());
        assert!(parsed.vat_conditions.is_empty());
    }
}
