//! Infrastructure layer: the persistence collaborator of the ordering domain.
//!
//! Stores orders, enforces optimistic concurrency per order id, and hands the
//! events each commit produced to an event bus (outbox-style).

pub mod command_dispatcher;
pub mod repository;

mod integration_tests;

pub use command_dispatcher::{DispatchError, OrderDispatcher};
pub use repository::{InMemoryOrderRepository, ORDER_AGGREGATE_TYPE, OrderRepository, RepositoryError};
