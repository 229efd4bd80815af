//! Synchronous in-process bus, used by tests and single-node setups.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, mpsc};

use thiserror::Error;

use crate::bus::{EventBus, Subscription};

#[derive(Debug, Error)]
pub enum InMemoryBusError {
    #[error("event bus lock poisoned")]
    Poisoned,
}

/// Fans every published message out to the subscribers alive at that moment.
///
/// A subscriber whose receiving half was dropped is pruned on the next
/// publish. Nothing is buffered for subscribers that join later.
#[derive(Debug)]
pub struct InMemoryEventBus<M> {
    senders: Mutex<Vec<mpsc::Sender<M>>>,
    published: AtomicU64,
}

impl<M> InMemoryEventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted by `publish` so far.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Subscribers still registered (dropped ones linger until the next publish).
    pub fn subscriber_count(&self) -> Result<usize, InMemoryBusError> {
        let senders = self.senders.lock().map_err(|_| InMemoryBusError::Poisoned)?;
        Ok(senders.len())
    }
}

impl<M> Default for InMemoryEventBus<M> {
    fn default() -> Self {
        Self {
            senders: Mutex::new(Vec::new()),
            published: AtomicU64::new(0),
        }
    }
}

impl<M> EventBus<M> for InMemoryEventBus<M>
where
    M: Clone + Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut senders = self.senders.lock().map_err(|_| InMemoryBusError::Poisoned)?;

        let before = senders.len();
        senders.retain(|tx| tx.send(message.clone()).is_ok());
        self.published.fetch_add(1, Ordering::Relaxed);

        tracing::trace!(
            delivered = senders.len(),
            pruned = before - senders.len(),
            "message published"
        );
        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        match self.senders.lock() {
            Ok(mut senders) => senders.push(tx),
            Err(_) => tracing::warn!("event bus lock poisoned; subscription will stay empty"),
        }

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[test]
    fn every_subscriber_receives_in_publish_order() {
        let bus = InMemoryEventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();

        bus.publish(1u32).unwrap();
        bus.publish(2u32).unwrap();

        assert_eq!(a.recv().unwrap(), 1);
        assert_eq!(a.recv().unwrap(), 2);
        assert_eq!(b.try_recv().unwrap(), 1);
        assert_eq!(b.try_recv().unwrap(), 2);
        assert_eq!(bus.published(), 2);
    }

    #[test]
    fn dropped_subscribers_are_pruned_without_failing_publish() {
        let bus = InMemoryEventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count().unwrap(), 2);

        assert!(bus.publish("still fine").is_ok());

        assert_eq!(bus.subscriber_count().unwrap(), 1);
        assert_eq!(kept.try_recv().unwrap(), "still fine");
    }

    #[test]
    fn late_subscribers_only_see_later_messages() {
        let bus = InMemoryEventBus::new();
        bus.publish(1u8).unwrap();

        let late = bus.subscribe();
        assert!(late.recv_timeout(Duration::from_millis(10)).is_err());

        bus.publish(2u8).unwrap();
        assert_eq!(late.recv_timeout(Duration::from_secs(1)).unwrap(), 2);
    }
}
