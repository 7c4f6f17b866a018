use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::location::normalize_city;
use crate::reference::ReferenceTableError;

/// Regional price multipliers keyed by lowercase city name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityTable {
    pub multipliers: BTreeMap<String, Decimal>,
}

impl CityTable {
    pub fn get(&self, location: &str) -> Option<Decimal> {
        self.multipliers.get(&normalize_city(location)).copied()
    }

    pub fn validate(&self) -> Result<(), ReferenceTableError> {
        for (city, multiplier) in &self.multipliers {
            if *city != normalize_city(city) {
                return Err(ReferenceTableError::Validation(format!(
                    "cities key `{city}` must be a lowercase city name"
                )));
            }
            if *multiplier <= Decimal::ZERO {
                return Err(ReferenceTableError::Validation(format!(
                    "cities.{city} multiplier must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CityTable {
    fn default() -> Self {
        let multipliers = [
            ("paris", 125),
            ("marseille", 100),
            ("lyon", 115),
            ("toulouse", 95),
            ("nice", 120),
            ("nantes", 105),
            ("bordeaux", 110),
        ];

        Self {
            multipliers: multipliers
                .into_iter()
                .map(|(city, hundredths)| (city.to_string(), Decimal::new(hundredths, 2)))
                .collect(),
        }
    }
}
