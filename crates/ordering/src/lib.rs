//! Ordering domain module.
//!
//! Owns the lifecycle of a single purchase order: status transitions, line
//! item consolidation, totals, and the domain events recorded along the way.
//! Pure domain logic: no IO, no storage, no dispatch.

pub mod error;
pub mod event;
pub mod item;
pub mod order;
pub mod policy;
pub mod status;
pub mod values;

pub use error::{OrderError, OrderResult};
pub use event::{
    OrderCancelled, OrderEvent, OrderShipped, OrderSnapshot, OrderStarted,
    StatusChangedToAwaitingValidation, StatusChangedToPaid, StatusChangedToStockConfirmed,
};
pub use item::{LineItem, NewLineItem, ProductId};
pub use order::{Order, OrderId, PlaceOrder};
pub use policy::{Annotation, Decision, Guard, OnReject, StatusChange, StatusPolicy, TransitionRule};
pub use status::OrderStatus;
pub use values::{Address, BuyerId, PaymentDetails, PaymentMethodId};
