use rust_decimal::Decimal;

use crate::domain::budget::BudgetTier;
use crate::domain::task::TaskKind;

/// No task may be priced below this margin rate.
pub fn margin_protection_min() -> Decimal {
    Decimal::new(15, 2)
}

pub trait MarginPolicy: Send + Sync {
    /// `subtotal` is part of the contract so job-size curves can be added
    /// without touching callers; the dynamic policy ignores it.
    fn margin_rate(&self, task: &TaskKind, budget: &BudgetTier, subtotal: Decimal) -> Decimal;
}

impl<T: MarginPolicy + ?Sized> MarginPolicy for &T {
    fn margin_rate(&self, task: &TaskKind, budget: &BudgetTier, subtotal: Decimal) -> Decimal {
        (**self).margin_rate(task, budget, subtotal)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DynamicMarginPolicy {
    base_margin: Decimal,
    complex_tasks: Vec<TaskKind>,
}

impl DynamicMarginPolicy {
    pub fn new(base_margin: Decimal) -> Self {
        Self {
            base_margin,
            complex_tasks: vec![
                TaskKind::Plumbing,
                TaskKind::TileRemoval,
                TaskKind::FloorInstallation,
            ],
        }
    }

    pub fn base_margin(&self) -> Decimal {
        self.base_margin
    }

    pub fn is_complex(&self, task: &TaskKind) -> bool {
        self.complex_tasks.contains(task)
    }
}

impl Default for DynamicMarginPolicy {
    fn default() -> Self {
        Self::new(Decimal::new(20, 2))
    }
}

impl MarginPolicy for DynamicMarginPolicy {
    fn margin_rate(&self, task: &TaskKind, budget: &BudgetTier, _subtotal: Decimal) -> Decimal {
        let mut rate = self.base_margin;

        match budget.resolved() {
            BudgetTier::BudgetConscious => rate *= Decimal::new(8, 1),
            BudgetTier::Premium => rate *= Decimal::new(13, 1),
            BudgetTier::Standard | BudgetTier::Unrecognized(_) => {}
        }

        if self.is_complex(task) {
            rate *= Decimal::new(11, 1);
        }

        rate.max(margin_protection_min())
    }
}
