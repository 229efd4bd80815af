//! Integration tests for the order pipeline.
//!
//! Tests: Dispatcher → Order → Repository commit → Outbox → EventBus → subscriber
//!
//! Verifies:
//! - events reach subscribers in recording order, after the commit
//! - ignored and rejected operations publish nothing
//! - concurrent modifications are detected and can be retried after a reload
//! - a bus outage never fails a committed command; delivery catches up later

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use chrono::Utc;
    use rust_decimal_macros::dec;

    use orderflow_core::AggregateRoot;
    use orderflow_events::{Event, EventBus, EventEnvelope, InMemoryEventBus, Subscription};
    use orderflow_ordering::{
        Address, BuyerId, NewLineItem, Order, OrderError, OrderEvent, OrderStatus, PaymentDetails,
        PaymentMethodId, PlaceOrder, ProductId,
    };

    use crate::command_dispatcher::{DispatchError, OrderDispatcher};
    use crate::repository::{InMemoryOrderRepository, OrderRepository};

    type Bus = Arc<InMemoryEventBus<EventEnvelope<OrderEvent>>>;
    type Dispatcher = OrderDispatcher<InMemoryOrderRepository<Bus>>;

    fn setup() -> (Dispatcher, Subscription<EventEnvelope<OrderEvent>>) {
        let bus: Bus = Arc::new(InMemoryEventBus::new());
        let sub = bus.subscribe();
        (OrderDispatcher::new(InMemoryOrderRepository::new(bus)), sub)
    }

    fn place_cmd() -> PlaceOrder {
        PlaceOrder {
            user_id: "user-1".to_string(),
            user_name: "jdoe".to_string(),
            address: Some(Address::new("15703 NE 61st Ct", "Redmond", "WA", "U.S.", "98052")),
            payment: PaymentDetails {
                card_type_id: 2,
                card_number: "5105105105105100".to_string(),
                card_security_number: "321".to_string(),
                card_holder_name: "Jane Doe".to_string(),
                card_expiration: Utc::now(),
            },
            buyer_id: None,
            payment_method_id: None,
            taxes: dec!(3),
        }
    }

    fn basket() -> Vec<NewLineItem> {
        vec![
            NewLineItem::new(ProductId(1), "p1", dec!(10), dec!(0), "p1.png").with_units(2),
            NewLineItem::new(ProductId(2), "p2", dec!(5), dec!(1), "p2.png"),
        ]
    }

    fn received(sub: &Subscription<EventEnvelope<OrderEvent>>) -> Vec<EventEnvelope<OrderEvent>> {
        std::iter::from_fn(|| sub.try_recv().ok()).collect()
    }

    #[test]
    fn full_lifecycle_publishes_every_event_once_in_order() {
        let (dispatcher, sub) = setup();
        let id = dispatcher.place(place_cmd(), basket()).unwrap();

        dispatcher.execute(id, Order::set_awaiting_validation).unwrap();
        dispatcher.execute(id, Order::set_stock_confirmed).unwrap();
        dispatcher
            .execute(id, |order| {
                order.set_payment_verified(BuyerId(5), PaymentMethodId(8));
                Ok(())
            })
            .unwrap();
        dispatcher.execute(id, Order::set_paid).unwrap();
        let shipped = dispatcher.execute(id, Order::set_shipped).unwrap();

        assert_eq!(shipped.status(), OrderStatus::Shipped);
        assert_eq!(shipped.total(), dec!(27));
        assert_eq!(shipped.buyer_id(), Some(BuyerId(5)));

        let envelopes = received(&sub);
        let types: Vec<&str> = envelopes.iter().map(|e| e.payload().event_type()).collect();
        assert_eq!(
            types,
            vec![
                "ordering.order.started",
                "ordering.order.status_changed_to_awaiting_validation",
                "ordering.order.status_changed_to_stock_confirmed",
                "ordering.order.status_changed_to_paid",
                "ordering.order.shipped",
            ]
        );
        let sequences: Vec<u64> = envelopes.iter().map(|e| e.sequence_number()).collect();
        assert_eq!(sequences, vec![1, 2, 3, 4, 5]);
        assert!(envelopes.iter().all(|e| e.aggregate_id() == id.0));
    }

    #[test]
    fn ignored_change_publishes_nothing_and_keeps_version() {
        let (dispatcher, sub) = setup();
        let id = dispatcher.place(place_cmd(), basket()).unwrap();
        received(&sub);

        let order = dispatcher.execute(id, Order::set_paid).unwrap();

        assert_eq!(order.status(), OrderStatus::Submitted);
        assert_eq!(order.version(), 1);
        assert!(received(&sub).is_empty());
    }

    #[test]
    fn illegal_shipment_is_terminal_and_not_committed() {
        let (dispatcher, sub) = setup();
        let id = dispatcher.place(place_cmd(), basket()).unwrap();
        received(&sub);

        let err = dispatcher.execute(id, Order::set_shipped).unwrap_err();

        assert!(!err.is_retryable());
        assert!(matches!(
            err,
            DispatchError::Order(OrderError::IllegalStatusTransition {
                from: OrderStatus::Submitted,
                to: OrderStatus::Shipped,
                ..
            })
        ));
        assert_eq!(dispatcher.repository().get(id).unwrap().status(), OrderStatus::Submitted);
        assert!(received(&sub).is_empty());
    }

    #[test]
    fn stock_rejection_commits_cancellation_without_publishing() {
        let (dispatcher, sub) = setup();
        let id = dispatcher.place(place_cmd(), basket()).unwrap();
        dispatcher.execute(id, Order::set_awaiting_validation).unwrap();
        received(&sub);

        let order = dispatcher
            .execute(id, |order| order.set_cancelled_when_stock_rejected(&[ProductId(2)]))
            .unwrap();

        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.description(), Some("The product items don't have stock: (p2)."));
        assert_eq!(dispatcher.repository().get(id).unwrap().status(), OrderStatus::Cancelled);
        assert!(received(&sub).is_empty());
    }

    #[test]
    fn invalid_placement_stores_nothing() {
        let (dispatcher, sub) = setup();
        let mut cmd = place_cmd();
        cmd.address = None;

        let err = dispatcher.place(cmd, basket()).unwrap_err();

        assert!(matches!(err, DispatchError::Order(OrderError::Validation(_))));
        assert!(received(&sub).is_empty());
    }

    #[test]
    fn concurrent_modification_is_detected_and_retry_succeeds() {
        let (dispatcher, sub) = setup();
        let id = dispatcher.place(place_cmd(), basket()).unwrap();
        received(&sub);
        let repo = dispatcher.repository();

        let mut stale = repo.get(id).unwrap();
        dispatcher.execute(id, Order::set_awaiting_validation).unwrap();

        stale.set_cancelled().unwrap();
        let err: DispatchError = repo.update(&mut stale).unwrap_err().into();
        assert!(err.is_retryable());

        // Reload and retry the same intent against the fresh state.
        let cancelled = dispatcher.execute(id, Order::set_cancelled).unwrap();
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert_eq!(cancelled.version(), 3);

        let types: Vec<&str> = received(&sub).iter().map(|e| e.payload().event_type()).collect();
        assert_eq!(
            types,
            vec![
                "ordering.order.status_changed_to_awaiting_validation",
                "ordering.order.cancelled",
            ]
        );
    }

    /// Bus that can be taken down and brought back.
    #[derive(Debug, Default)]
    struct OutageBus {
        down: AtomicBool,
        inner: InMemoryEventBus<EventEnvelope<OrderEvent>>,
    }

    impl EventBus<EventEnvelope<OrderEvent>> for OutageBus {
        type Error = &'static str;

        fn publish(&self, message: EventEnvelope<OrderEvent>) -> Result<(), Self::Error> {
            if self.down.load(Ordering::SeqCst) {
                return Err("down");
            }
            self.inner.publish(message).map_err(|_| "poisoned")
        }

        fn subscribe(&self) -> Subscription<EventEnvelope<OrderEvent>> {
            self.inner.subscribe()
        }
    }

    #[test]
    fn bus_outage_does_not_fail_committed_commands() {
        let bus = Arc::new(OutageBus::default());
        let sub = bus.subscribe();
        let dispatcher = OrderDispatcher::new(InMemoryOrderRepository::new(bus.clone()));
        bus.down.store(true, Ordering::SeqCst);

        let id = dispatcher.place(place_cmd(), basket()).unwrap();
        let order = dispatcher.execute(id, Order::set_awaiting_validation).unwrap();
        assert_eq!(order.status(), OrderStatus::AwaitingValidation);
        assert_eq!(order.version(), 2);

        let repo = dispatcher.repository();
        assert_eq!(repo.get(id).unwrap().status(), OrderStatus::AwaitingValidation);
        assert_eq!(repo.pending_dispatch().unwrap(), 2);
        assert!(sub.recv_timeout(Duration::from_millis(10)).is_err());

        bus.down.store(false, Ordering::SeqCst);
        assert_eq!(repo.dispatch_pending().unwrap(), 2);

        let started = sub.recv().unwrap();
        assert_eq!(started.aggregate_id(), id.0);
        assert!(matches!(started.payload(), OrderEvent::OrderStarted(_)));
        let awaiting = sub.recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(awaiting.sequence_number(), 2);
        assert!(received(&sub).is_empty());
        assert_eq!(bus.inner.published(), 2);
    }
}
