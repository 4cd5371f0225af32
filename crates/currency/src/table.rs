use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use makechange_core::{DomainError, DomainResult};

use crate::currency::{CurrencySpec, MinorUnitScale};
use crate::decompose::{decompose, ChangeError, DecompositionResult};

/// Immutable lookup of currency code → [`CurrencySpec`].
///
/// Built once at startup and shared read-only; tests can build their own with
/// synthetic denomination sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyTable {
    currencies: BTreeMap<String, CurrencySpec>,
}

impl CurrencyTable {
    pub fn new(currencies: impl IntoIterator<Item = CurrencySpec>) -> DomainResult<Self> {
        let mut map = BTreeMap::new();
        for spec in currencies {
            let code = spec.code().to_string();
            if map.insert(code.clone(), spec).is_some() {
                return Err(DomainError::invariant(format!("duplicate currency code {code}")));
            }
        }
        Ok(Self { currencies: map })
    }

    /// The six currencies the service ships with.
    pub fn standard() -> DomainResult<Self> {
        Self::new([usd()?, cad()?, gbp()?, ils()?, jpy()?, aud()?])
    }

    pub fn get(&self, code: &str) -> Option<&CurrencySpec> {
        self.currencies.get(code)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.currencies.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencySpec> {
        self.currencies.values()
    }

    /// Look up `code` and decompose `amount` (major units) into change.
    pub fn decompose(&self, code: &str, amount: Decimal) -> Result<DecompositionResult, ChangeError> {
        let spec = self
            .get(code)
            .ok_or_else(|| ChangeError::InvalidCurrency(code.to_string()))?;
        decompose(spec, amount)
    }
}

fn usd() -> DomainResult<CurrencySpec> {
    CurrencySpec::new(
        "USD",
        "$",
        "US Dollar",
        MinorUnitScale::Hundredths,
        [
            ("hundred dollar bills", dec!(100)),
            ("fifty dollar bills", dec!(50)),
            ("twenty dollar bills", dec!(20)),
            ("ten dollar bills", dec!(10)),
            ("five dollar bills", dec!(5)),
            ("one dollar bills", dec!(1)),
            ("quarters", dec!(0.25)),
            ("dimes", dec!(0.10)),
            ("nickels", dec!(0.05)),
            ("pennies", dec!(0.01)),
        ],
    )
}

fn cad() -> DomainResult<CurrencySpec> {
    CurrencySpec::new(
        "CAD",
        "C$",
        "Canadian Dollar",
        MinorUnitScale::Hundredths,
        [
            ("hundred dollar bills", dec!(100)),
            ("fifty dollar bills", dec!(50)),
            ("twenty dollar bills", dec!(20)),
            ("ten dollar bills", dec!(10)),
            ("five dollar bills", dec!(5)),
            ("toonies", dec!(2)),
            ("loonies", dec!(1)),
            ("quarters", dec!(0.25)),
            ("dimes", dec!(0.10)),
            ("nickels", dec!(0.05)),
            ("pennies", dec!(0.01)),
        ],
    )
}

fn gbp() -> DomainResult<CurrencySpec> {
    CurrencySpec::new(
        "GBP",
        "£",
        "British Pound",
        MinorUnitScale::Hundredths,
        [
            ("fifty pound notes", dec!(50)),
            ("twenty pound notes", dec!(20)),
            ("ten pound notes", dec!(10)),
            ("five pound notes", dec!(5)),
            ("two pounds", dec!(2)),
            ("one pound", dec!(1)),
            ("fifty pence", dec!(0.50)),
            ("twenty pence", dec!(0.20)),
            ("ten pence", dec!(0.10)),
            ("five pence", dec!(0.05)),
            ("two pence", dec!(0.02)),
            ("one penny", dec!(0.01)),
        ],
    )
}

fn ils() -> DomainResult<CurrencySpec> {
    CurrencySpec::new(
        "ILS",
        "₪",
        "Israeli Shekel",
        MinorUnitScale::Tenths,
        [
            ("two hundred shekel notes", dec!(200)),
            ("one hundred shekel notes", dec!(100)),
            ("fifty shekel notes", dec!(50)),
            ("twenty shekel notes", dec!(20)),
            ("ten shekels", dec!(10)),
            ("five shekels", dec!(5)),
            ("two shekels", dec!(2)),
            ("one shekel", dec!(1)),
            ("fifty agorot", dec!(0.5)),
            ("ten agorot", dec!(0.1)),
        ],
    )
}

fn jpy() -> DomainResult<CurrencySpec> {
    CurrencySpec::new(
        "JPY",
        "¥",
        "Japanese Yen",
        MinorUnitScale::Whole,
        [
            ("10000 yen notes", dec!(10000)),
            ("5000 yen notes", dec!(5000)),
            ("1000 yen notes", dec!(1000)),
            ("500 yen", dec!(500)),
            ("100 yen", dec!(100)),
            ("50 yen", dec!(50)),
            ("10 yen", dec!(10)),
            ("5 yen", dec!(5)),
            ("1 yen", dec!(1)),
        ],
    )
}

// No one- or two-cent coins: cash amounts round to 5 cents, so odd cents are
// reported as a remainder.
fn aud() -> DomainResult<CurrencySpec> {
    CurrencySpec::new(
        "AUD",
        "A$",
        "Australian Dollar",
        MinorUnitScale::Hundredths,
        [
            ("hundred dollar bills", dec!(100)),
            ("fifty dollar bills", dec!(50)),
            ("twenty dollar bills", dec!(20)),
            ("ten dollar bills", dec!(10)),
            ("five dollar bills", dec!(5)),
            ("two dollar coins", dec!(2)),
            ("one dollar coins", dec!(1)),
            ("fifty cents", dec!(0.50)),
            ("twenty cents", dec!(0.20)),
            ("ten cents", dec!(0.10)),
            ("five cents", dec!(0.05)),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_has_six_currencies() {
        let table = CurrencyTable::standard().unwrap();
        let codes: Vec<&str> = table.codes().collect();
        assert_eq!(codes, vec!["AUD", "CAD", "GBP", "ILS", "JPY", "USD"]);
    }

    #[test]
    fn standard_table_scales_and_symbols() {
        let table = CurrencyTable::standard().unwrap();
        assert_eq!(table.get("JPY").unwrap().scale(), MinorUnitScale::Whole);
        assert_eq!(table.get("ILS").unwrap().scale(), MinorUnitScale::Tenths);
        assert_eq!(table.get("GBP").unwrap().symbol(), "£");
        assert_eq!(table.get("CAD").unwrap().name(), "Canadian Dollar");
        assert_eq!(table.get("AUD").unwrap().smallest().label(), "five cents");
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let err = CurrencyTable::new([usd().unwrap(), usd().unwrap()]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn unknown_code_is_invalid_currency() {
        let table = CurrencyTable::standard().unwrap();
        let err = table.decompose("XYZ", dec!(1)).unwrap_err();
        assert_eq!(err, ChangeError::InvalidCurrency("XYZ".to_string()));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = CurrencyTable::standard().unwrap();
        assert!(table.get("usd").is_none());
    }
}
