//! Greedy decomposition of an amount into denominations.
//!
//! All arithmetic runs on whole minor units (`u64`); `Decimal` only appears at
//! the edges (input amount, nominal values, display strings).

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use makechange_core::DomainError;

use crate::currency::CurrencySpec;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChangeError {
    #[error("invalid currency: {0}")]
    InvalidCurrency(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Arithmetic could not be carried out (e.g. a malformed table entry).
    #[error("{0}")]
    Computation(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// One entry of a breakdown: `count` pieces of a denomination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeLine {
    pub label: String,
    pub count: u64,
    pub nominal: Decimal,
    pub minor_units: u64,
}

impl core::fmt::Display for ChangeLine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.count, self.label)
    }
}

/// Outcome of a decomposition. Computed per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecompositionResult {
    currency_code: String,
    symbol: String,
    amount: Decimal,
    minor_units: u64,
    lines: Vec<ChangeLine>,
    remainder_minor_units: u64,
    formatted_amount: String,
    message: String,
}

impl DecompositionResult {
    pub fn currency_code(&self) -> &str {
        &self.currency_code
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The requested amount, as given.
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The requested amount after rounding to minor units.
    pub fn minor_units(&self) -> u64 {
        self.minor_units
    }

    /// Breakdown, largest denomination first; every count is positive.
    pub fn lines(&self) -> &[ChangeLine] {
        &self.lines
    }

    /// Minor units no denomination could cover. Zero for well-formed tables.
    pub fn remainder_minor_units(&self) -> u64 {
        self.remainder_minor_units
    }

    pub fn formatted_amount(&self) -> &str {
        &self.formatted_amount
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// `"{count} {label}"` per line, e.g. `"2 quarters"`.
    pub fn change_results(&self) -> Vec<String> {
        self.lines.iter().map(ChangeLine::to_string).collect()
    }

    pub fn allocated_minor_units(&self) -> u64 {
        self.lines.iter().map(|l| l.count * l.minor_units).sum()
    }
}

/// Break `amount` (major units) into the fewest pieces of `spec`'s
/// denominations, assuming the denomination system is canonical.
pub fn decompose(spec: &CurrencySpec, amount: Decimal) -> Result<DecompositionResult, ChangeError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ChangeError::InvalidAmount(format!(
            "amount cannot be negative ({amount})"
        )));
    }

    let scale = spec.scale();
    let total = scale
        .to_minor(amount)
        .ok_or_else(|| ChangeError::InvalidAmount(format!("amount {amount} is too large")))?;

    let mut remaining = total;
    let mut lines = Vec::new();

    for denomination in spec.denominations() {
        let minor = match scale.to_minor(denomination.nominal()) {
            Some(m) if m > 0 => m,
            _ => {
                return Err(ChangeError::Computation(format!(
                    "denomination '{}' of {} has no whole minor-unit value",
                    denomination.label(),
                    spec.code()
                )));
            }
        };

        let count = remaining / minor;
        remaining %= minor;

        if count > 0 {
            lines.push(ChangeLine {
                label: denomination.label().to_string(),
                count,
                nominal: denomination.nominal(),
                minor_units: minor,
            });
        }
    }

    if remaining > 0 {
        tracing::warn!(
            currency = spec.code(),
            amount = %amount,
            remainder_minor_units = remaining,
            "unexpected remaining minor units after making change"
        );
    }

    let formatted_amount = scale.format(amount);
    let message = summarize(spec, &formatted_amount, &lines, remaining);

    Ok(DecompositionResult {
        currency_code: spec.code().to_string(),
        symbol: spec.symbol().to_string(),
        amount,
        minor_units: total,
        lines,
        remainder_minor_units: remaining,
        formatted_amount,
        message,
    })
}

fn summarize(spec: &CurrencySpec, formatted_amount: &str, lines: &[ChangeLine], remainder: u64) -> String {
    let symbol = spec.symbol();

    if lines.is_empty() && remainder == 0 {
        return format!("No change needed for {}", spec.display(Decimal::ZERO));
    }

    let leftover = || {
        let major = Decimal::from(remainder) / Decimal::from(spec.scale().factor());
        format!("{} could not be made from available denominations", spec.display(major))
    };

    if lines.is_empty() {
        return format!("Cannot make change for {symbol}{formatted_amount}: {}", leftover());
    }

    let list = lines.iter().map(ChangeLine::to_string).collect::<Vec<_>>().join(", ");
    let mut message = format!("We can make change for {symbol}{formatted_amount} with: {list}");
    if remainder > 0 {
        message.push_str("; ");
        message.push_str(&leftover());
    }
    message
}
