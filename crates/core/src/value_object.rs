//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**: they are defined entirely by their
//! attribute values, so two with the same values are equal.

/// Marker trait for value objects.
///
/// - **Value Object**: no identity (`Money`, channel balance maps, computed balances)
/// - **Entity**: has identity (`Agent`, `Transaction`)
///
/// Value objects are immutable in spirit: to "modify" one, build a new one.
///
/// ```ignore
/// let a = Money::from_major_units(100);
/// let b = Money::from_minor(10_000);
/// assert_eq!(a, b); // equal by value
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
