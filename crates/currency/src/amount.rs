//! Conversion of caller-supplied amounts into `Decimal`.

use core::str::FromStr;

use rust_decimal::Decimal;

use crate::decompose::ChangeError;

/// Convert a floating-point amount (as received in JSON) to a `Decimal`.
///
/// Goes through the shortest round-trip text form, so `13.67` stays `13.67`
/// instead of its binary expansion.
pub fn amount_from_f64(value: f64) -> Result<Decimal, ChangeError> {
    if !value.is_finite() {
        return Err(ChangeError::InvalidAmount("amount must be a finite number".to_string()));
    }
    if value == 0.0 {
        return Ok(Decimal::ZERO);
    }
    if value < 0.0 {
        return Err(ChangeError::InvalidAmount(format!("amount cannot be negative ({value})")));
    }
    Decimal::from_str(&value.to_string())
        .map_err(|_| ChangeError::InvalidAmount(format!("amount {value} is out of range")))
}

/// Parse a textual amount such as `"12.50"`.
pub fn parse_amount(value: &str) -> Result<Decimal, ChangeError> {
    let trimmed = value.trim();
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ChangeError::InvalidAmount(format!("'{value}' is not a number")))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ChangeError::InvalidAmount(format!("amount cannot be negative ({value})")));
    }
    Ok(amount)
}
