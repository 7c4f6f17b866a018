use std::fmt;

use serde::{Deserialize, Serialize};

/// Renovation task identifier as produced by the transcript parser.
///
/// Known tasks get their own variant so fallback paths for anything else are
/// visible at the call site through [`TaskKind::Unrecognized`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskKind {
    TileRemoval,
    Plumbing,
    ToiletReplacement,
    VanityInstallation,
    Painting,
    FloorInstallation,
    GeneralRenovation,
    EnergyEfficiency,
    Unrecognized(String),
}

impl TaskKind {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "tile_removal" => Self::TileRemoval,
            "plumbing" => Self::Plumbing,
            "toilet_replacement" => Self::ToiletReplacement,
            "vanity_installation" => Self::VanityInstallation,
            "painting" => Self::Painting,
            "floor_installation" => Self::FloorInstallation,
            "general_renovation" => Self::GeneralRenovation,
            "energy_efficiency" => Self::EnergyEfficiency,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::TileRemoval => "tile_removal",
            Self::Plumbing => "plumbing",
            Self::ToiletReplacement => "toilet_replacement",
            Self::VanityInstallation => "vanity_installation",
            Self::Painting => "painting",
            Self::FloorInstallation => "floor_installation",
            Self::GeneralRenovation => "general_renovation",
            Self::EnergyEfficiency => "energy_efficiency",
            Self::Unrecognized(value) => value,
        }
    }
}

impl From<String> for TaskKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for TaskKind {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<TaskKind> for String {
    fn from(value: TaskKind) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named job-site condition that scales labor hours.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComplexityFactor {
    SmallRoom,
    StandardRoom,
    LargeRoom,
    DifficultAccess,
    OldBuilding,
    NewConstruction,
    Unrecognized(String),
}

impl ComplexityFactor {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "small_room" => Self::SmallRoom,
            "standard_room" => Self::StandardRoom,
            "large_room" => Self::LargeRoom,
            "difficult_access" => Self::DifficultAccess,
            "old_building" => Self::OldBuilding,
            "new_construction" => Self::NewConstruction,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::SmallRoom => "small_room",
            Self::StandardRoom => "standard_room",
            Self::LargeRoom => "large_room",
            Self::DifficultAccess => "difficult_access",
            Self::OldBuilding => "old_building",
            Self::NewConstruction => "new_construction",
            Self::Unrecognized(value) => value,
        }
    }
}

impl From<String> for ComplexityFactor {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ComplexityFactor> for String {
    fn from(value: ComplexityFactor) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ComplexityFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade skill tier that selects the hourly rate column for a city.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    #[default]
    General,
    Specialized,
    Expert,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Specialized => "specialized",
            Self::Expert => "expert",
        }
    }
}
