//! Per-aggregate event buffer (outbox staging area).

use serde::{Deserialize, Serialize};

/// Ordered, append-only list of events recorded by one aggregate instance.
///
/// The buffer lives exactly as long as the in-memory aggregate between load and
/// commit. The owning aggregate keeps it private and is the only caller of
/// [`EventBuffer::push`]; the persistence layer calls [`EventBuffer::drain`]
/// once after a successful commit. Nothing here is durable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBuffer<E> {
    events: Vec<E>,
}

impl<E> EventBuffer<E> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Record an event after every already-recorded one.
    pub fn push(&mut self, event: E) {
        self.events.push(event);
    }

    /// All recorded events in append order. Can be called any number of times.
    pub fn as_slice(&self) -> &[E] {
        &self.events
    }

    pub fn iter(&self) -> core::slice::Iter<'_, E> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take every recorded event in append order and leave the buffer empty.
    pub fn drain(&mut self) -> Vec<E> {
        core::mem::take(&mut self.events)
    }
}

impl<E> Default for EventBuffer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, E> IntoIterator for &'a EventBuffer<E> {
    type Item = &'a E;
    type IntoIter = core::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
