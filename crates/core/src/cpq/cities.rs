use rust_decimal::Decimal;

use crate::reference::CityTable;

pub trait CityMultiplierProvider: Send + Sync {
    /// Regional multiplier for `location`, `None` when the city is unknown.
    fn city_multiplier(&self, location: &str) -> Option<Decimal>;

    fn is_known_city(&self, location: &str) -> bool {
        self.city_multiplier(location).is_some()
    }
}

impl<T: CityMultiplierProvider + ?Sized> CityMultiplierProvider for &T {
    fn city_multiplier(&self, location: &str) -> Option<Decimal> {
        (**self).city_multiplier(location)
    }
}

impl CityMultiplierProvider for CityTable {
    fn city_multiplier(&self, location: &str) -> Option<Decimal> {
        self.get(location)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::CityMultiplierProvider;
    use crate::reference::CityTable;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let table = CityTable::default();

        assert_eq!(table.city_multiplier("Paris"), Some(Decimal::new(125, 2)));
        assert_eq!(table.city_multiplier(" toulouse "), Some(Decimal::new(95, 2)));
        assert!(table.is_known_city("NICE"));
    }

    #[test]
    fn unknown_city_has_no_multiplier() {
        let table = CityTable::default();

        assert_eq!(table.city_multiplier("Lille"), None);
        assert!(!table.is_known_city(""));
    }
}
