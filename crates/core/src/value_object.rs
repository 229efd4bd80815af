//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attributes. To "change"
/// one, build a new value. Shipping addresses and payment details are typical
/// examples: two addresses with the same fields are the same address.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
