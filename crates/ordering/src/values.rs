//! Value objects and foreign identifiers carried by an order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderflow_core::ValueObject;

use crate::error::{OrderError, OrderResult};

/// Identifier of the buyer, known once the payment method is verified.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuyerId(pub u64);

/// Identifier of the buyer's verified payment method.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodId(pub u64);

impl core::fmt::Display for BuyerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

impl ValueObject for Address {}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        country: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            state: state.into(),
            country: country.into(),
            zip_code: zip_code.into(),
        }
    }

    /// Street, city, country and zip code are required; state is optional.
    pub fn validate(&self) -> OrderResult<()> {
        let required = [
            ("street", &self.street),
            ("city", &self.city),
            ("country", &self.country),
            ("zip_code", &self.zip_code),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(OrderError::validation(format!(
                    "address {field} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Card details supplied when the order is placed.
///
/// Only travels inside the `OrderStarted` event so the payment side can
/// verify or register the payment method; the order itself does not keep it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub card_type_id: u32,
    pub card_number: String,
    pub card_security_number: String,
    pub card_holder_name: String,
    pub card_expiration: DateTime<Utc>,
}

impl ValueObject for PaymentDetails {}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address::new("1 Main St", "Springfield", "", "US", "12345")
    }

    #[test]
    fn address_without_state_is_valid() {
        assert!(address().validate().is_ok());
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut addr = address();
        addr.city = "   ".to_string();

        match addr.validate() {
            Err(OrderError::Validation(msg)) => assert!(msg.contains("city")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }
}
