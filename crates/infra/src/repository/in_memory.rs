use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use uuid::Uuid;

use orderflow_core::{AggregateId, AggregateRoot, ExpectedVersion};
use orderflow_events::{EventBus, EventEnvelope};
use orderflow_ordering::{Order, OrderEvent, OrderId};

use super::{ORDER_AGGREGATE_TYPE, OrderRepository, RepositoryError};

#[derive(Debug)]
struct StoredOrder {
    /// Committed state; never holds pending events.
    order: Order,
    version: u64,
    last_sequence: u64,
}

/// In-memory order store with a transactional outbox.
///
/// Intended for tests/dev. A commit writes the order state and enqueues the
/// drained events under the same lock, so the outbox order matches commit
/// order. The outbox is then flushed to the bus; anything that fails to
/// publish stays queued for [`InMemoryOrderRepository::dispatch_pending`].
#[derive(Debug)]
pub struct InMemoryOrderRepository<B> {
    orders: RwLock<HashMap<OrderId, StoredOrder>>,
    outbox: Mutex<VecDeque<EventEnvelope<OrderEvent>>>,
    bus: B,
}

impl<B> InMemoryOrderRepository<B> {
    pub fn new(bus: B) -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            outbox: Mutex::new(VecDeque::new()),
            bus,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Envelopes committed but not yet published.
    pub fn pending_dispatch(&self) -> Result<usize, RepositoryError> {
        let outbox = self.outbox.lock().map_err(|_| RepositoryError::Poisoned)?;
        Ok(outbox.len())
    }

    fn commit(&self, id: OrderId, order: &mut Order, is_new: bool) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().map_err(|_| RepositoryError::Poisoned)?;
        let mut outbox = self.outbox.lock().map_err(|_| RepositoryError::Poisoned)?;

        let (current, last_sequence) = match orders.get(&id) {
            Some(stored) => (stored.version, stored.last_sequence),
            None if is_new => (0, 0),
            None => return Err(RepositoryError::NotFound(id)),
        };

        let expected = if is_new {
            ExpectedVersion::Exact(0)
        } else {
            ExpectedVersion::Exact(order.version())
        };
        expected
            .check(current)
            .map_err(|e| RepositoryError::Concurrency(e.to_string()))?;

        let version = current + 1;
        order.mark_persisted(id, version);

        let mut state = order.clone();
        state.drain_events();

        let mut sequence = last_sequence;
        orders.insert(
            id,
            StoredOrder {
                order: state,
                version,
                last_sequence: last_sequence + order.pending_events().len() as u64,
            },
        );

        // Committed; now the events may leave the aggregate.
        let events = order.drain_events();
        let count = events.len();
        for event in events {
            sequence += 1;
            outbox.push_back(EventEnvelope::new(
                Uuid::now_v7(),
                id.0,
                ORDER_AGGREGATE_TYPE,
                sequence,
                event,
            ));
        }

        tracing::info!(order_id = %id, version, events = count, "order committed");
        Ok(())
    }
}

impl<B> InMemoryOrderRepository<B>
where
    B: EventBus<EventEnvelope<OrderEvent>>,
{
    /// Publish queued envelopes in order, stopping at the first failure.
    ///
    /// Returns how many were delivered. A failed envelope stays at the front
    /// of the outbox, so a later call redelivers it (at-least-once).
    pub fn dispatch_pending(&self) -> Result<usize, RepositoryError> {
        let mut outbox = self.outbox.lock().map_err(|_| RepositoryError::Poisoned)?;
        let mut delivered = 0;

        while let Some(envelope) = outbox.front() {
            if let Err(err) = self.bus.publish(envelope.clone()) {
                tracing::warn!(
                    order_id = %envelope.aggregate_id(),
                    sequence = envelope.sequence_number(),
                    remaining = outbox.len(),
                    error = ?err,
                    "event publication failed"
                );
                return Err(RepositoryError::Publish(format!("{err:?}")));
            }
            outbox.pop_front();
            delivered += 1;
        }

        Ok(delivered)
    }

    /// Post-commit flush. The commit already stands, so a delivery failure is
    /// only logged; the envelopes wait for the next `dispatch_pending`.
    fn flush_outbox(&self) {
        if let Err(err) = self.dispatch_pending() {
            tracing::warn!(error = %err, "events left in outbox after commit");
        }
    }
}

impl<B> OrderRepository for InMemoryOrderRepository<B>
where
    B: EventBus<EventEnvelope<OrderEvent>>,
{
    fn add(&self, order: &mut Order) -> Result<OrderId, RepositoryError> {
        if let Some(id) = order.order_id() {
            return Err(RepositoryError::AlreadyPersisted(id));
        }

        let id = OrderId::new(AggregateId::new());
        self.commit(id, order, true)?;
        self.flush_outbox();
        Ok(id)
    }

    fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        let orders = self.orders.read().map_err(|_| RepositoryError::Poisoned)?;
        orders
            .get(&id)
            .map(|stored| stored.order.clone())
            .ok_or(RepositoryError::NotFound(id))
    }

    fn update(&self, order: &mut Order) -> Result<(), RepositoryError> {
        let id = order.order_id().ok_or(RepositoryError::NotPersisted)?;
        self.commit(id, order, false)?;
        self.flush_outbox();
        Ok(())
    }
}
