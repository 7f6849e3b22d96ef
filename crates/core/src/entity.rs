//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Store adapters key their tables by this identifier.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
