//! Entity trait: records that keep their identity while their state changes.

/// Anything the ledger stores and references by identifier.
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    /// Name used in error messages and log fields (e.g. `"pool"`).
    const KIND: &'static str;

    fn id(&self) -> &Self::Id;

    /// Soft-deleted entities stay referenced by history but accept no new work.
    fn is_active(&self) -> bool {
        true
    }
}
