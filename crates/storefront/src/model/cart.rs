use crate::model::{Product, ProductId, UserId};
use crate::store::Revision;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product in a cart, with the product fields copied at first add.
///
/// Serialized as the remote document body, keyed by the product id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    /// Always ≥ 1. A line that would drop to zero is deleted instead.
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    pub fn from_product(product: &Product, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            quantity: 1,
            image: product.image.clone(),
            category: product.category.clone(),
            added_at,
        }
    }

    /// `price × quantity`, or `None` if that doesn't fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// The cart of one signed-in shopper: a mirror of their remote `cart` collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub owner: UserId,
    /// At most one line per product, in the order the store lists them.
    pub lines: Vec<CartLine>,
    /// Revision of the remote collection this state reflects.
    pub revision: Revision,
}

/// Payload for opening a cart. The owner is the actor id; state is loaded from the store.
#[derive(Debug, Clone, Default)]
pub struct CartCreate;

/// Derived totals, computed the same way wherever they are displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    /// `None` when the sum overflows a `Decimal`.
    pub total_price: Option<Decimal>,
    /// Sum of quantities, not the number of lines.
    pub total_items: u64,
    pub line_count: usize,
}

impl Cart {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            lines: Vec::new(),
            revision: 0,
        }
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of the line totals. `None` on overflow.
    pub fn total_price(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.line_total()?))
    }

    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals {
            total_price: self.total_price(),
            total_items: self.total_items(),
            line_count: self.lines.len(),
        }
    }
}
