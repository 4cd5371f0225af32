use std::collections::HashSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use makechange_core::{DomainError, DomainResult, ValueObject};

/// How many minor units make up one major unit of a currency.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MinorUnitScale {
    /// No subdivision (yen).
    Whole,
    /// Tenths of a major unit (shekel, counted in 10-agorot steps).
    Tenths,
    /// Hundredths of a major unit (cents, pence).
    Hundredths,
}

impl MinorUnitScale {
    pub fn factor(self) -> u64 {
        match self {
            MinorUnitScale::Whole => 1,
            MinorUnitScale::Tenths => 10,
            MinorUnitScale::Hundredths => 100,
        }
    }

    /// Decimal places used when rendering an amount for display.
    ///
    /// Only whole-unit currencies drop the fraction; every other scale renders
    /// two places, independent of the factor used for computation.
    pub fn display_places(self) -> u32 {
        match self {
            MinorUnitScale::Whole => 0,
            MinorUnitScale::Tenths | MinorUnitScale::Hundredths => 2,
        }
    }

    /// Convert a major-unit value into whole minor units, rounding half away
    /// from zero. `None` when the value is negative or too large for `u64`.
    pub fn to_minor(self, major: Decimal) -> Option<u64> {
        if major.is_sign_negative() && !major.is_zero() {
            return None;
        }
        major
            .checked_mul(Decimal::from(self.factor()))?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u64()
    }

    /// Render a major-unit amount with this scale's display places.
    pub fn format(self, major: Decimal) -> String {
        let places = self.display_places();
        let mut rounded = major.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(places);
        if rounded.is_zero() {
            // Avoid "-0.00" for inputs like -0.0.
            rounded.set_sign_positive(true);
        }
        rounded.to_string()
    }
}

/// A named unit of currency value (bill, coin, note).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denomination {
    label: String,
    nominal: Decimal,
}

impl ValueObject for Denomination {}

impl Denomination {
    pub fn new(label: impl Into<String>, nominal: Decimal) -> Self {
        Self {
            label: label.into(),
            nominal,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Nominal value in major units (0.25 for a quarter).
    pub fn nominal(&self) -> Decimal {
        self.nominal
    }
}

/// A currency and its denominations, sorted by nominal value descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencySpec {
    code: String,
    symbol: String,
    name: String,
    scale: MinorUnitScale,
    denominations: Vec<Denomination>,
}

impl CurrencySpec {
    /// Build a currency from its denominations (any order).
    ///
    /// Rejects an empty list, non-positive or duplicate nominal values, and
    /// values smaller than one minor unit at `scale`.
    pub fn new<I, L>(
        code: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        scale: MinorUnitScale,
        denominations: I,
    ) -> DomainResult<Self>
    where
        I: IntoIterator<Item = (L, Decimal)>,
        L: Into<String>,
    {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(DomainError::validation("currency code cannot be empty"));
        }

        let mut denominations: Vec<Denomination> = denominations
            .into_iter()
            .map(|(label, nominal)| Denomination::new(label, nominal))
            .collect();

        if denominations.is_empty() {
            return Err(DomainError::validation(format!(
                "{code}: at least one denomination is required"
            )));
        }

        let mut seen: HashSet<Decimal> = HashSet::new();
        for d in &denominations {
            if d.nominal <= Decimal::ZERO {
                return Err(DomainError::validation(format!(
                    "{code}: denomination '{}' must have a positive value",
                    d.label
                )));
            }
            if !seen.insert(d.nominal.normalize()) {
                return Err(DomainError::invariant(format!(
                    "{code}: duplicate nominal value {} ('{}')",
                    d.nominal, d.label
                )));
            }
            match scale.to_minor(d.nominal) {
                Some(minor) if minor > 0 => {}
                _ => {
                    return Err(DomainError::validation(format!(
                        "{code}: denomination '{}' is smaller than one minor unit",
                        d.label
                    )));
                }
            }
        }

        // Stable sort; nominal values are distinct so order is total.
        denominations.sort_by(|a, b| b.nominal.cmp(&a.nominal));

        Ok(Self {
            code,
            symbol: symbol.into(),
            name: name.into(),
            scale,
            denominations,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scale(&self) -> MinorUnitScale {
        self.scale
    }

    /// Denominations, largest first.
    pub fn denominations(&self) -> &[Denomination] {
        &self.denominations
    }

    pub fn smallest(&self) -> &Denomination {
        // Non-empty by construction.
        &self.denominations[self.denominations.len() - 1]
    }

    /// Render an amount with the currency symbol, e.g. `$12.50` or `¥1500`.
    pub fn display(&self, major: Decimal) -> String {
        format!("{}{}", self.symbol, self.scale.format(major))
    }
}
