//! Status transition policy.
//!
//! Every status change the order supports is one row of a static table:
//! which statuses it may start from, where it lands, what happens to the
//! description, and whether a refused attempt is ignored or fails.
//!
//! The policy is deliberately asymmetric. The early advances (awaiting
//! validation, stock confirmed, paid) are ignored when out of order so that
//! duplicated or retried commands are harmless. Shipping and ordinary
//! cancellation stand for irreversible real-world actions and fail loudly.

use crate::status::OrderStatus;

/// A status change requested of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusChange {
    AwaitingValidation,
    StockConfirmed,
    Paid,
    Shipped,
    Cancelled,
    CancelledDueToStockRejection,
}

/// Which current statuses admit a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Only from one of these statuses.
    OnlyFrom(&'static [OrderStatus]),
    /// From any status except these.
    AnyExcept(&'static [OrderStatus]),
}

impl Guard {
    pub fn admits(self, current: OrderStatus) -> bool {
        match self {
            Guard::OnlyFrom(allowed) => allowed.contains(&current),
            Guard::AnyExcept(denied) => !denied.contains(&current),
        }
    }
}

/// What a refused change does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnReject {
    /// No state change, no event, no error.
    Ignore,
    /// `OrderError::IllegalStatusTransition`.
    Fail,
}

/// Effect of an accepted change on the order description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Keep,
    Set(&'static str),
    /// Names of the rejected products, joined by ", ".
    RejectedProducts,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    pub change: StatusChange,
    pub target: OrderStatus,
    pub guard: Guard,
    pub on_reject: OnReject,
    pub annotation: Annotation,
}

/// Outcome of evaluating a change against the current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed { target: OrderStatus },
    Ignore,
    Reject { from: OrderStatus, to: OrderStatus },
}

pub const STOCK_CONFIRMED_DESCRIPTION: &str = "All the items were confirmed with available stock.";
pub const PAID_DESCRIPTION: &str = "The payment was performed at a simulated \"American Bank checking bank account ending on XX35071\"";
pub const SHIPPED_DESCRIPTION: &str = "The order was shipped.";
pub const CANCELLED_DESCRIPTION: &str = "The order was cancelled.";

const AWAITING_VALIDATION: TransitionRule = TransitionRule {
    change: StatusChange::AwaitingValidation,
    target: OrderStatus::AwaitingValidation,
    guard: Guard::OnlyFrom(&[OrderStatus::Submitted]),
    on_reject: OnReject::Ignore,
    annotation: Annotation::Keep,
};

const STOCK_CONFIRMED: TransitionRule = TransitionRule {
    change: StatusChange::StockConfirmed,
    target: OrderStatus::StockConfirmed,
    guard: Guard::OnlyFrom(&[OrderStatus::AwaitingValidation]),
    on_reject: OnReject::Ignore,
    annotation: Annotation::Set(STOCK_CONFIRMED_DESCRIPTION),
};

const PAID: TransitionRule = TransitionRule {
    change: StatusChange::Paid,
    target: OrderStatus::Paid,
    guard: Guard::OnlyFrom(&[OrderStatus::StockConfirmed]),
    on_reject: OnReject::Ignore,
    annotation: Annotation::Set(PAID_DESCRIPTION),
};

const SHIPPED: TransitionRule = TransitionRule {
    change: StatusChange::Shipped,
    target: OrderStatus::Shipped,
    guard: Guard::OnlyFrom(&[OrderStatus::Paid]),
    on_reject: OnReject::Fail,
    annotation: Annotation::Set(SHIPPED_DESCRIPTION),
};

const CANCELLED: TransitionRule = TransitionRule {
    change: StatusChange::Cancelled,
    target: OrderStatus::Cancelled,
    guard: Guard::AnyExcept(&[OrderStatus::Paid, OrderStatus::Shipped]),
    on_reject: OnReject::Fail,
    annotation: Annotation::Set(CANCELLED_DESCRIPTION),
};

const CANCELLED_DUE_TO_STOCK_REJECTION: TransitionRule = TransitionRule {
    change: StatusChange::CancelledDueToStockRejection,
    target: OrderStatus::Cancelled,
    guard: Guard::OnlyFrom(&[OrderStatus::AwaitingValidation]),
    on_reject: OnReject::Ignore,
    annotation: Annotation::RejectedProducts,
};

const RULES: [TransitionRule; 6] = [
    AWAITING_VALIDATION,
    STOCK_CONFIRMED,
    PAID,
    SHIPPED,
    CANCELLED,
    CANCELLED_DUE_TO_STOCK_REJECTION,
];

impl StatusChange {
    pub fn rule(self) -> &'static TransitionRule {
        match self {
            StatusChange::AwaitingValidation => &AWAITING_VALIDATION,
            StatusChange::StockConfirmed => &STOCK_CONFIRMED,
            StatusChange::Paid => &PAID,
            StatusChange::Shipped => &SHIPPED,
            StatusChange::Cancelled => &CANCELLED,
            StatusChange::CancelledDueToStockRejection => &CANCELLED_DUE_TO_STOCK_REJECTION,
        }
    }
}

impl TransitionRule {
    pub fn decide(&self, current: OrderStatus) -> Decision {
        if self.guard.admits(current) {
            return Decision::Proceed {
                target: self.target,
            };
        }
        match self.on_reject {
            OnReject::Ignore => Decision::Ignore,
            OnReject::Fail => Decision::Reject {
                from: current,
                to: self.target,
            },
        }
    }
}

/// Entry point to the transition table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusPolicy;

impl StatusPolicy {
    /// The whole table, in lifecycle order.
    pub fn rules() -> &'static [TransitionRule] {
        &RULES
    }

    pub fn decide(current: OrderStatus, change: StatusChange) -> Decision {
        change.rule().decide(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::status::OrderStatus::*;

    #[test]
    fn every_change_has_exactly_one_rule() {
        for rule in StatusPolicy::rules() {
            assert_eq!(rule.change.rule(), rule);
        }
        assert_eq!(StatusPolicy::rules().len(), 6);
    }

    #[test]
    fn early_advances_only_move_one_step_forward() {
        let cases = [
            (StatusChange::AwaitingValidation, Submitted, AwaitingValidation),
            (StatusChange::StockConfirmed, AwaitingValidation, StockConfirmed),
            (StatusChange::Paid, StockConfirmed, Paid),
        ];

        for (change, from, to) in cases {
            for current in OrderStatus::ALL {
                let expected = if current == from {
                    Decision::Proceed { target: to }
                } else {
                    Decision::Ignore
                };
                assert_eq!(StatusPolicy::decide(current, change), expected, "{change:?} from {current}");
            }
        }
    }

    #[test]
    fn shipping_requires_paid_and_fails_otherwise() {
        for current in OrderStatus::ALL {
            let decision = StatusPolicy::decide(current, StatusChange::Shipped);
            if current == Paid {
                assert_eq!(decision, Decision::Proceed { target: Shipped });
            } else {
                assert_eq!(decision, Decision::Reject { from: current, to: Shipped });
            }
        }
    }

    #[test]
    fn cancelling_fails_only_after_payment() {
        for current in OrderStatus::ALL {
            let decision = StatusPolicy::decide(current, StatusChange::Cancelled);
            if matches!(current, Paid | Shipped) {
                assert_eq!(decision, Decision::Reject { from: current, to: Cancelled });
            } else {
                assert_eq!(decision, Decision::Proceed { target: Cancelled });
            }
        }
    }

    #[test]
    fn stock_rejection_only_applies_while_awaiting_validation() {
        for current in OrderStatus::ALL {
            let decision =
                StatusPolicy::decide(current, StatusChange::CancelledDueToStockRejection);
            if current == AwaitingValidation {
                assert_eq!(decision, Decision::Proceed { target: Cancelled });
            } else {
                assert_eq!(decision, Decision::Ignore);
            }
        }
    }
}
