//! Aggregate root trait and optimistic concurrency expectations.

use crate::error::{DomainError, DomainResult};

/// Aggregate root capability.
///
/// A type is an aggregate root because it can report its identity and version
/// and hand over the domain events it recorded since it was loaded. There is
/// no base type to inherit from; implementing this trait is the whole contract.
///
/// Aggregates never dispatch their own events. The persistence layer commits
/// the new state first and then calls [`AggregateRoot::drain_events`] exactly
/// once.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Domain event type recorded by this aggregate.
    type Event: Clone + core::fmt::Debug;

    /// Returns the aggregate identifier, if persistence has assigned one.
    fn id(&self) -> Option<&Self::Id>;

    /// Version of the persisted state this instance was loaded from (0 if never stored).
    fn version(&self) -> u64;

    /// Events recorded since the aggregate was loaded or last drained, in order.
    fn pending_events(&self) -> &[Self::Event];

    /// Take all pending events, leaving none behind.
    fn drain_events(&mut self) -> Vec<Self::Event>;
}

/// Optimistic concurrency expectation for an aggregate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking.
    Any,
    /// Require the stored aggregate to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    pub fn check(self, actual: u64) -> DomainResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(DomainError::conflict(format!(
                "optimistic concurrency check failed (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_matches_every_version() {
        assert!(ExpectedVersion::Any.matches(0));
        assert!(ExpectedVersion::Any.matches(42));
    }

    #[test]
    fn exact_rejects_stale_version() {
        assert!(ExpectedVersion::Exact(3).check(3).is_ok());
        let err = ExpectedVersion::Exact(3).check(4).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
