use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::budget::BudgetTier;
use crate::domain::task::TaskKind;
use crate::reference::MaterialTable;

pub trait MaterialCostProvider: Send + Sync {
    /// Material cost in euros for `task` over `room_size` m².
    fn cost(&self, task: &TaskKind, room_size: Decimal, tier: &BudgetTier) -> Decimal;

    fn material_list(&self, task: &TaskKind, tier: &BudgetTier) -> Vec<String>;

    /// Tasks with a configured material record, in stable order.
    fn known_tasks(&self) -> Vec<TaskKind>;
}

impl<T: MaterialCostProvider + ?Sized> MaterialCostProvider for &T {
    fn cost(&self, task: &TaskKind, room_size: Decimal, tier: &BudgetTier) -> Decimal {
        (**self).cost(task, room_size, tier)
    }

    fn material_list(&self, task: &TaskKind, tier: &BudgetTier) -> Vec<String> {
        (**self).material_list(task, tier)
    }

    fn known_tasks(&self) -> Vec<TaskKind> {
        (**self).known_tasks()
    }
}

impl MaterialCostProvider for MaterialTable {
    fn cost(&self, task: &TaskKind, room_size: Decimal, tier: &BudgetTier) -> Decimal {
        let Some(tiers) = self.tasks.get(task) else {
            let rate = *self.fallback_rates.get(tier);
            debug!(
                event_name = "pricing.materials.fallback",
                task = %task,
                tier = %tier,
                rate_per_m2 = %rate,
                "task has no material table entry, using per-m2 fallback rate"
            );
            return room_size * rate;
        };

        let record = tiers.get(tier);
        let base = record.base_cost.unwrap_or(Decimal::ZERO);
        let variable = record.cost_per_m2.map(|rate| rate * room_size).unwrap_or(Decimal::ZERO);
        base + variable
    }

    fn material_list(&self, task: &TaskKind, tier: &BudgetTier) -> Vec<String> {
        match self.tasks.get(task) {
            Some(tiers) => tiers.get(tier).items.clone(),
            None => self.fallback_items.clone(),
        }
    }

    fn known_tasks(&self) -> Vec<TaskKind> {
        self.tasks().cloned().collect()
    }
}
