//! Order line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use orderflow_core::Entity;

use crate::error::{OrderError, OrderResult};

/// Catalog product identifier. Unique per order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Input for [`crate::Order::add_item`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub picture_url: String,
    pub units: u32,
}

impl NewLineItem {
    /// A single unit of the product.
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        unit_price: Decimal,
        discount: Decimal,
        picture_url: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            unit_price,
            discount,
            picture_url: picture_url.into(),
            units: 1,
        }
    }

    pub fn with_units(mut self, units: u32) -> Self {
        self.units = units;
        self
    }

    /// Checks that apply whether the line is new or merged into an existing one.
    pub(crate) fn validate(&self) -> OrderResult<()> {
        if self.units == 0 {
            return Err(OrderError::validation("Invalid number of units"));
        }
        if self.unit_price < Decimal::ZERO {
            return Err(OrderError::validation("unit price must not be negative"));
        }
        if self.discount < Decimal::ZERO {
            return Err(OrderError::validation("Discount is not valid"));
        }
        Ok(())
    }
}

/// One product line of an order.
///
/// Descriptive fields and the unit price never change. Later additions of the
/// same product only raise the discount and add units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    product_id: ProductId,
    product_name: String,
    picture_url: String,
    unit_price: Decimal,
    discount: Decimal,
    units: u32,
}

impl LineItem {
    pub(crate) fn new(input: NewLineItem) -> OrderResult<Self> {
        input.validate()?;

        let line = Self {
            product_id: input.product_id,
            product_name: input.product_name,
            picture_url: input.picture_url,
            unit_price: input.unit_price,
            discount: input.discount,
            units: input.units,
        };

        if line.subtotal() < line.discount {
            return Err(OrderError::validation(
                "The total of order item is lower than applied discount",
            ));
        }

        Ok(line)
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn picture_url(&self) -> &str {
        &self.picture_url
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Flat discount for the whole line (not per unit).
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    /// `unit_price × units`, before discount.
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.units)
    }

    /// Fold a validated addition of the same product into this line.
    ///
    /// Fails without touching the line when the combined units do not fit.
    pub(crate) fn merge(&mut self, addition: &NewLineItem) -> OrderResult<()> {
        debug_assert_eq!(addition.product_id, self.product_id);

        let units = self
            .units
            .checked_add(addition.units)
            .ok_or_else(|| OrderError::validation("Invalid number of units"))?;

        if addition.discount > self.discount {
            self.discount = addition.discount;
        }
        self.units = units;
        Ok(())
    }
}

impl Entity for LineItem {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.product_id
    }
}
