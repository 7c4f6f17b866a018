use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatCategory {
    Standard,
    Reduced,
    SuperReduced,
    Zero,
}

impl VatCategory {
    pub const ALL: [VatCategory; 4] = [Self::Standard, Self::Reduced, Self::SuperReduced, Self::Zero];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Reduced => "reduced",
            Self::SuperReduced => "super_reduced",
            Self::Zero => "zero",
        }
    }
}

/// Project conditions that can move a task into a different VAT category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VatConditions {
    pub energy_efficiency: bool,
    pub accessibility_improvements: bool,
    pub building_age_years: Option<u32>,
}

impl VatConditions {
    pub fn is_empty(&self) -> bool {
        !self.energy_efficiency
            && !self.accessibility_improvements
            && self.building_age_years.is_none()
    }
}
