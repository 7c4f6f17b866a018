use std::fmt;

use serde::{Deserialize, Serialize};

/// Client budget preference; selects material quality and scales the margin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BudgetTier {
    BudgetConscious,
    #[default]
    Standard,
    Premium,
    Unrecognized(String),
}

impl BudgetTier {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "budget_conscious" => Self::BudgetConscious,
            "standard" => Self::Standard,
            "premium" => Self::Premium,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::BudgetConscious => "budget_conscious",
            Self::Standard => "standard",
            Self::Premium => "premium",
            Self::Unrecognized(value) => value,
        }
    }

    /// Tier used for table lookups. Anything unrecognized prices as standard.
    pub fn resolved(&self) -> Self {
        match self {
            Self::Unrecognized(_) => Self::Standard,
            known => known.clone(),
        }
    }
}

impl From<String> for BudgetTier {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<BudgetTier> for String {
    fn from(value: BudgetTier) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per budget tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerTier<T> {
    pub budget_conscious: T,
    pub standard: T,
    pub premium: T,
}

impl<T> PerTier<T> {
    pub fn get(&self, tier: &BudgetTier) -> &T {
        match tier.resolved() {
            BudgetTier::BudgetConscious => &self.budget_conscious,
            BudgetTier::Premium => &self.premium,
            BudgetTier::Standard | BudgetTier::Unrecognized(_) => &self.standard,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BudgetTier, &T)> {
        [
            (BudgetTier::BudgetConscious, &self.budget_conscious),
            (BudgetTier::Standard, &self.standard),
            (BudgetTier::Premium, &self.premium),
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{BudgetTier, PerTier};

    #[test]
    fn unrecognized_tier_resolves_to_standard() {
        let tier = BudgetTier::parse("luxury");
        assert_eq!(tier.as_str(), "luxury");
        assert_eq!(tier.resolved(), BudgetTier::Standard);
    }

    #[test]
    fn per_tier_lookup_follows_resolution() {
        let values = PerTier { budget_conscious: 30, standard: 50, premium: 80 };
        assert_eq!(*values.get(&BudgetTier::BudgetConscious), 30);
        assert_eq!(*values.get(&BudgetTier::Premium), 80);
        assert_eq!(*values.get(&BudgetTier::parse("gold-plated")), 50);
    }
}
