use serde::{Deserialize, Serialize};

/// Order status lifecycle.
///
/// Legal moves between these are defined in [`crate::policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Submitted,
    AwaitingValidation,
    StockConfirmed,
    Paid,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Submitted,
        OrderStatus::AwaitingValidation,
        OrderStatus::StockConfirmed,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ];

    /// Stable numeric id used by external read models.
    pub fn id(self) -> u8 {
        match self {
            OrderStatus::Submitted => 1,
            OrderStatus::AwaitingValidation => 2,
            OrderStatus::StockConfirmed => 3,
            OrderStatus::Paid => 4,
            OrderStatus::Shipped => 5,
            OrderStatus::Cancelled => 6,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            OrderStatus::Submitted => "Submitted",
            OrderStatus::AwaitingValidation => "AwaitingValidation",
            OrderStatus::StockConfirmed => "StockConfirmed",
            OrderStatus::Paid => "Paid",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
