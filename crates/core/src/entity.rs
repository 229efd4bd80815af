//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Entities inside an aggregate are located by this identity; two entities
/// with the same id are the same entity even if their attributes differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
