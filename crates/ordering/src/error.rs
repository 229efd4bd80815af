//! Ordering error model.

use thiserror::Error;

use orderflow_core::DomainError;

use crate::order::OrderId;
use crate::status::OrderStatus;

pub type OrderResult<T> = Result<T, OrderError>;

/// Failures raised by the order aggregate.
///
/// Only two kinds exist. Out-of-order early status advances are not errors at
/// all; they are ignored (see [`crate::policy::StatusPolicy`]).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Malformed construction or item input. Nothing was created or changed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A strict transition (ship, cancel) was attempted from a status that does
    /// not allow it. The order is unchanged; retrying will not help.
    #[error("Is not possible to change the order status from {from} to {to}.")]
    IllegalStatusTransition {
        order_id: Option<OrderId>,
        from: OrderStatus,
        to: OrderStatus,
    },
}

impl OrderError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<OrderError> for DomainError {
    fn from(value: OrderError) -> Self {
        match value {
            OrderError::Validation(msg) => DomainError::Validation(msg),
            illegal @ OrderError::IllegalStatusTransition { .. } => {
                DomainError::InvariantViolation(illegal.to_string())
            }
        }
    }
}
