//! `makechange-currency`: currency tables and change-making.
//!
//! Pure, synchronous domain logic: no IO, no HTTP, no shared mutable state.

pub mod amount;
pub mod currency;
pub mod decompose;
pub mod table;

pub use amount::{amount_from_f64, parse_amount};
pub use currency::{CurrencySpec, Denomination, MinorUnitScale};
pub use decompose::{decompose, ChangeError, ChangeLine, DecompositionResult};
pub use table::CurrencyTable;
