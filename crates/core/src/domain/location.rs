use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical form of a city name used as a key in labor and city tables.
pub fn normalize_city(location: &str) -> String {
    location.trim().to_lowercase()
}

/// VAT jurisdiction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Country {
    #[default]
    France,
    Germany,
    Spain,
    Italy,
    Unrecognized(String),
}

impl Country {
    pub fn parse(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        match normalized.as_str() {
            "france" => Self::France,
            "germany" => Self::Germany,
            "spain" => Self::Spain,
            "italy" => Self::Italy,
            _ => Self::Unrecognized(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::France => "france",
            Self::Germany => "germany",
            Self::Spain => "spain",
            Self::Italy => "italy",
            Self::Unrecognized(value) => value,
        }
    }
}

impl From<String> for Country {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Country> for String {
    fn from(value: Country) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
