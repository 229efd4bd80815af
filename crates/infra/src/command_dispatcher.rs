//! Command execution pipeline for orders.
//!
//! ```text
//! request
//!   ↓
//! 1. Load the order (or place a new one)
//!   ↓
//! 2. Invoke exactly one aggregate operation
//!   ↓
//! 3. Commit with an optimistic concurrency check
//!   ↓
//! 4. Drain and publish the recorded events
//! ```
//!
//! Steps 3 and 4 belong to the repository; this module only sequences them.
//! Once step 3 succeeds the command has succeeded: events the bus could not
//! take yet stay in the outbox for `dispatch_pending`.
//! There is no retry here: a `Concurrency` failure goes back to the caller,
//! who reloads and tries again.

use thiserror::Error;

use orderflow_ordering::{NewLineItem, Order, OrderError, OrderId, OrderResult, PlaceOrder};

use crate::repository::{OrderRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The order refused the operation (validation, illegal transition).
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl DispatchError {
    /// Only a lost optimistic concurrency race is worth retrying after a reload.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DispatchError::Repository(RepositoryError::Concurrency(_)))
    }
}

#[derive(Debug)]
pub struct OrderDispatcher<R> {
    repository: R,
}

impl<R> OrderDispatcher<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn into_inner(self) -> R {
        self.repository
    }
}

impl<R> OrderDispatcher<R>
where
    R: OrderRepository,
{
    /// Place an order with its initial lines and store it.
    pub fn place(
        &self,
        cmd: PlaceOrder,
        items: impl IntoIterator<Item = NewLineItem>,
    ) -> Result<OrderId, DispatchError> {
        let mut order = Order::place(cmd)?;
        for item in items {
            order.add_item(item)?;
        }

        let id = self.repository.add(&mut order)?;
        tracing::info!(order_id = %id, items = order.items().len(), "order placed");
        Ok(id)
    }

    /// Load an order, run one operation on it and commit the result.
    ///
    /// An operation that leaves the order untouched (an ignored status change)
    /// is not committed, so it does not bump the stored version.
    pub fn execute<F>(&self, id: OrderId, operation: F) -> Result<Order, DispatchError>
    where
        F: FnOnce(&mut Order) -> OrderResult<()>,
    {
        let _span = tracing::info_span!("order_command", order_id = %id).entered();

        let mut order = self.repository.get(id)?;
        let before = order.clone();

        operation(&mut order)?;

        if order == before {
            tracing::debug!("operation left the order unchanged; nothing to commit");
            return Ok(order);
        }

        self.repository.update(&mut order)?;
        Ok(order)
    }
}
