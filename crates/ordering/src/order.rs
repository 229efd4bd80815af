use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_core::{AggregateId, AggregateRoot, Entity};
use orderflow_events::EventBuffer;

use crate::error::{OrderError, OrderResult};
use crate::event::{
    OrderCancelled, OrderEvent, OrderShipped, OrderSnapshot, OrderStarted,
    StatusChangedToAwaitingValidation, StatusChangedToPaid, StatusChangedToStockConfirmed,
};
use crate::item::{LineItem, NewLineItem, ProductId};
use crate::policy::{Annotation, Decision, StatusChange};
use crate::status::OrderStatus;
use crate::values::{Address, BuyerId, PaymentDetails, PaymentMethodId};

/// Order identifier, assigned by the persistence layer on first save.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Input for [`Order::place`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub user_id: String,
    pub user_name: String,
    pub address: Option<Address>,
    pub payment: PaymentDetails,
    pub buyer_id: Option<BuyerId>,
    pub payment_method_id: Option<PaymentMethodId>,
    pub taxes: Decimal,
}

/// Aggregate root: Order.
///
/// All mutation goes through the methods below. Each accepted status change
/// records at most one [`OrderEvent`] in a private buffer that the
/// persistence layer drains after committing (see [`AggregateRoot`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: Option<OrderId>,
    order_date: DateTime<Utc>,
    address: Option<Address>,
    buyer_id: Option<BuyerId>,
    payment_id: Option<PaymentMethodId>,
    status: OrderStatus,
    description: Option<String>,
    taxes: Decimal,
    items: Vec<LineItem>,
    is_draft: bool,
    events: EventBuffer<OrderEvent>,
    version: u64,
}

impl Order {
    fn blank(is_draft: bool) -> Self {
        Self {
            id: None,
            order_date: Utc::now(),
            address: None,
            buyer_id: None,
            payment_id: None,
            status: OrderStatus::Submitted,
            description: None,
            taxes: Decimal::ZERO,
            items: Vec::new(),
            is_draft,
            events: EventBuffer::new(),
            version: 0,
        }
    }

    /// Placeholder order used to price a basket before it is placed.
    ///
    /// Has no address, records no events.
    pub fn new_draft() -> Self {
        Self::blank(true)
    }

    /// Place a new order and record `OrderStarted`.
    pub fn place(cmd: PlaceOrder) -> OrderResult<Self> {
        let PlaceOrder {
            user_id,
            user_name,
            address,
            payment,
            buyer_id,
            payment_method_id,
            taxes,
        } = cmd;

        let address = address.ok_or_else(|| OrderError::validation("address is required"))?;
        address.validate()?;

        if taxes < Decimal::ZERO {
            return Err(OrderError::validation("taxes must not be negative"));
        }

        let mut order = Self::blank(false);
        order.address = Some(address);
        order.buyer_id = buyer_id;
        order.payment_id = payment_method_id;
        order.taxes = taxes;

        tracing::debug!(user_id = %user_id, "order placed");

        let started = OrderEvent::OrderStarted(OrderStarted {
            order: order.snapshot(),
            user_id,
            user_name,
            payment,
            occurred_at: order.order_date,
        });
        order.events.push(started);

        Ok(order)
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.id
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    /// Always present for placed orders, absent for drafts.
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    pub fn buyer_id(&self) -> Option<BuyerId> {
        self.buyer_id
    }

    pub fn payment_id(&self) -> Option<PaymentMethodId> {
        self.payment_id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn taxes(&self) -> Decimal {
        self.taxes
    }

    /// Line items in the order they were first added.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_draft(&self) -> bool {
        self.is_draft
    }

    /// Events recorded and not yet drained, in order.
    pub fn events(&self) -> &[OrderEvent] {
        self.events.as_slice()
    }

    /// `Σ(unit_price × units) + taxes − Σ(discount)`.
    pub fn total(&self) -> Decimal {
        let gross: Decimal = self.items.iter().map(LineItem::subtotal).sum();
        let discounts: Decimal = self.items.iter().map(LineItem::discount).sum();
        gross + self.taxes - discounts
    }

    pub fn snapshot(&self) -> OrderSnapshot {
        OrderSnapshot {
            id: self.id,
            order_date: self.order_date,
            status: self.status,
            description: self.description.clone(),
            address: self.address.clone(),
            buyer_id: self.buyer_id,
            payment_id: self.payment_id,
            items: self.items.clone(),
            taxes: self.taxes,
            total: self.total(),
        }
    }

    /// Add a product line, or fold it into the existing line for that product.
    ///
    /// Merging keeps the higher of the two discounts and adds the units; the
    /// existing name, picture and unit price win. Records no event.
    pub fn add_item(&mut self, input: NewLineItem) -> OrderResult<()> {
        input.validate()?;

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.id() == &input.product_id)
        {
            return existing.merge(&input);
        }

        self.items.push(LineItem::new(input)?);
        Ok(())
    }

    /// Record the verified buyer and payment method. No precondition, no event.
    pub fn set_payment_verified(&mut self, buyer_id: BuyerId, payment_id: PaymentMethodId) {
        self.buyer_id = Some(buyer_id);
        self.payment_id = Some(payment_id);
    }

    /// Submitted → AwaitingValidation. Ignored from any other status.
    pub fn set_awaiting_validation(&mut self) -> OrderResult<()> {
        self.change_status(StatusChange::AwaitingValidation, &[])
    }

    /// AwaitingValidation → StockConfirmed. Ignored from any other status.
    pub fn set_stock_confirmed(&mut self) -> OrderResult<()> {
        self.change_status(StatusChange::StockConfirmed, &[])
    }

    /// StockConfirmed → Paid. Ignored from any other status.
    pub fn set_paid(&mut self) -> OrderResult<()> {
        self.change_status(StatusChange::Paid, &[])
    }

    /// Paid → Shipped. Fails with `IllegalStatusTransition` from any other status.
    pub fn set_shipped(&mut self) -> OrderResult<()> {
        self.change_status(StatusChange::Shipped, &[])
    }

    /// Any status but Paid/Shipped → Cancelled. Fails with
    /// `IllegalStatusTransition` once the order is paid or shipped.
    pub fn set_cancelled(&mut self) -> OrderResult<()> {
        self.change_status(StatusChange::Cancelled, &[])
    }

    /// AwaitingValidation → Cancelled, naming the products that lack stock.
    ///
    /// Unlike [`Order::set_cancelled`] this records no `Cancelled` event.
    /// Ignored from any other status.
    pub fn set_cancelled_when_stock_rejected(
        &mut self,
        rejected: &[ProductId],
    ) -> OrderResult<()> {
        self.change_status(StatusChange::CancelledDueToStockRejection, rejected)
    }

    /// Called by the persistence layer after a successful commit.
    ///
    /// Assigns the id on first save and records the committed version used for
    /// the next optimistic concurrency check.
    pub fn mark_persisted(&mut self, id: OrderId, version: u64) {
        self.id = Some(id);
        self.version = version;
    }

    fn change_status(&mut self, change: StatusChange, rejected: &[ProductId]) -> OrderResult<()> {
        let rule = change.rule();
        let from = self.status;

        let target = match rule.decide(from) {
            Decision::Proceed { target } => target,
            Decision::Ignore => {
                tracing::debug!(order_id = ?self.id, status = %from, ?change, "status change ignored");
                return Ok(());
            }
            Decision::Reject { from, to } => {
                tracing::warn!(order_id = ?self.id, %from, %to, "illegal status transition");
                return Err(OrderError::IllegalStatusTransition {
                    order_id: self.id,
                    from,
                    to,
                });
            }
        };

        self.status = target;
        match rule.annotation {
            Annotation::Keep => {}
            Annotation::Set(text) => self.description = Some(text.to_owned()),
            Annotation::RejectedProducts => {
                self.description = Some(self.stock_rejection_description(rejected));
            }
        }

        if let Some(event) = self.event_for(change) {
            self.events.push(event);
        }

        tracing::debug!(order_id = ?self.id, %from, to = %target, "order status changed");
        Ok(())
    }

    fn event_for(&self, change: StatusChange) -> Option<OrderEvent> {
        let occurred_at = Utc::now();
        let event = match change {
            StatusChange::AwaitingValidation => {
                OrderEvent::StatusChangedToAwaitingValidation(StatusChangedToAwaitingValidation {
                    order_id: self.id,
                    items: self.items.clone(),
                    occurred_at,
                })
            }
            StatusChange::StockConfirmed => {
                OrderEvent::StatusChangedToStockConfirmed(StatusChangedToStockConfirmed {
                    order_id: self.id,
                    occurred_at,
                })
            }
            StatusChange::Paid => OrderEvent::StatusChangedToPaid(StatusChangedToPaid {
                order_id: self.id,
                items: self.items.clone(),
                occurred_at,
            }),
            StatusChange::Shipped => OrderEvent::Shipped(OrderShipped {
                order: self.snapshot(),
                occurred_at,
            }),
            StatusChange::Cancelled => OrderEvent::Cancelled(OrderCancelled {
                order: self.snapshot(),
                occurred_at,
            }),
            // Stock rejection cancels silently; consumers only see the stored status.
            StatusChange::CancelledDueToStockRejection => return None,
        };
        Some(event)
    }

    fn stock_rejection_description(&self, rejected: &[ProductId]) -> String {
        let names: Vec<&str> = self
            .items
            .iter()
            .filter(|line| rejected.contains(&line.product_id()))
            .map(LineItem::product_name)
            .collect();
        format!("The product items don't have stock: ({}).", names.join(", "))
    }
}

impl AggregateRoot for Order {
    type Id = OrderId;
    type Event = OrderEvent;

    fn id(&self) -> Option<&Self::Id> {
        self.id.as_ref()
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn pending_events(&self) -> &[Self::Event] {
        self.events.as_slice()
    }

    fn drain_events(&mut self) -> Vec<Self::Event> {
        self.events.drain()
    }
}
