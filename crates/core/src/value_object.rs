//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: a denomination
/// labelled "quarters" worth 0.25 is the same denomination wherever it appears.
/// To "modify" one, build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Coin {
///     label: String,
///     minor_units: u64,
/// }
///
/// impl ValueObject for Coin {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
