//! Order persistence boundary.

pub mod in_memory;

pub use in_memory::InMemoryOrderRepository;

use std::sync::Arc;

use thiserror::Error;

use orderflow_ordering::{Order, OrderId};

/// Aggregate type recorded on every published envelope.
pub const ORDER_AGGREGATE_TYPE: &str = "ordering.order";

/// Persistence errors.
///
/// These are infrastructure failures, distinct from the order's own
/// `OrderError` (validation, illegal transitions).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// `update` was called with an order that was never added.
    #[error("order has not been persisted yet")]
    NotPersisted,

    /// `add` was called with an order that already has an id.
    #[error("order {0} is already persisted")]
    AlreadyPersisted(OrderId),

    /// The stored order moved on since this instance was loaded. Reload and retry.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    /// Publishing queued events failed; they are still waiting in the outbox.
    /// Only `dispatch_pending` reports this, never a save.
    #[error("event publication failed: {0}")]
    Publish(String),

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Loads and saves orders.
///
/// On every successful `add`/`update` the implementation commits the order
/// state first, then drains the order's pending events exactly once and
/// dispatches them at least once, in the order they were recorded.
///
/// A save returns `Ok` once the commit stands, even if delivery has to wait:
/// undelivered events stay queued rather than failing the save.
pub trait OrderRepository: Send + Sync {
    /// Store a new order. Assigns its id and version on success.
    fn add(&self, order: &mut Order) -> Result<OrderId, RepositoryError>;

    /// Load the last committed state of an order (with no pending events).
    fn get(&self, id: OrderId) -> Result<Order, RepositoryError>;

    /// Store changes to an order loaded via `get`.
    ///
    /// Fails with `Concurrency` if someone else committed in between.
    fn update(&self, order: &mut Order) -> Result<(), RepositoryError>;
}

impl<R> OrderRepository for Arc<R>
where
    R: OrderRepository + ?Sized,
{
    fn add(&self, order: &mut Order) -> Result<OrderId, RepositoryError> {
        (**self).add(order)
    }

    fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        (**self).get(id)
    }

    fn update(&self, order: &mut Order) -> Result<(), RepositoryError> {
        (**self).update(order)
    }
}
