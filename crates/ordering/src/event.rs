//! Domain events recorded by the order aggregate.
//!
//! Events are recorded in memory and only dispatched by the persistence layer
//! after the order state has been committed. A freshly placed order has no id
//! yet, so the `order_id` carried here is optional; the envelope built at
//! dispatch time always carries the assigned id.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_events::Event;

use crate::item::LineItem;
use crate::order::OrderId;
use crate::status::OrderStatus;
use crate::values::{Address, BuyerId, PaymentDetails, PaymentMethodId};

/// Read-only copy of an order's state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: Option<OrderId>,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub description: Option<String>,
    pub address: Option<Address>,
    pub buyer_id: Option<BuyerId>,
    pub payment_id: Option<PaymentMethodId>,
    pub items: Vec<LineItem>,
    pub taxes: Decimal,
    pub total: Decimal,
}

/// Event: OrderStarted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStarted {
    pub order: OrderSnapshot,
    pub user_id: String,
    pub user_name: String,
    pub payment: PaymentDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChangedToAwaitingValidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangedToAwaitingValidation {
    pub order_id: Option<OrderId>,
    pub items: Vec<LineItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChangedToStockConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangedToStockConfirmed {
    pub order_id: Option<OrderId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChangedToPaid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangedToPaid {
    pub order_id: Option<OrderId>,
    pub items: Vec<LineItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderShipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShipped {
    pub order: OrderSnapshot,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order: OrderSnapshot,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderStarted(OrderStarted),
    StatusChangedToAwaitingValidation(StatusChangedToAwaitingValidation),
    StatusChangedToStockConfirmed(StatusChangedToStockConfirmed),
    StatusChangedToPaid(StatusChangedToPaid),
    Shipped(OrderShipped),
    Cancelled(OrderCancelled),
}

impl OrderEvent {
    /// Id of the order the event belongs to, if it had one when recorded.
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            OrderEvent::OrderStarted(e) => e.order.id,
            OrderEvent::StatusChangedToAwaitingValidation(e) => e.order_id,
            OrderEvent::StatusChangedToStockConfirmed(e) => e.order_id,
            OrderEvent::StatusChangedToPaid(e) => e.order_id,
            OrderEvent::Shipped(e) => e.order.id,
            OrderEvent::Cancelled(e) => e.order.id,
        }
    }
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderStarted(_) => "ordering.order.started",
            OrderEvent::StatusChangedToAwaitingValidation(_) => {
                "ordering.order.status_changed_to_awaiting_validation"
            }
            OrderEvent::StatusChangedToStockConfirmed(_) => {
                "ordering.order.status_changed_to_stock_confirmed"
            }
            OrderEvent::StatusChangedToPaid(_) => "ordering.order.status_changed_to_paid",
            OrderEvent::Shipped(_) => "ordering.order.shipped",
            OrderEvent::Cancelled(_) => "ordering.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderStarted(e) => e.occurred_at,
            OrderEvent::StatusChangedToAwaitingValidation(e) => e.occurred_at,
            OrderEvent::StatusChangedToStockConfirmed(e) => e.occurred_at,
            OrderEvent::StatusChangedToPaid(e) => e.occurred_at,
            OrderEvent::Shipped(e) => e.occurred_at,
            OrderEvent::Cancelled(e) => e.occurred_at,
        }
    }
}
