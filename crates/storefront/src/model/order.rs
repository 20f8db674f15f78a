use crate::model::{CartLine, CurrencyCode, ProductId, ShippingAddress, UserId};
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Client-generated order id: `order_<unix millis>_<9 random base36 chars>`.
///
/// Collisions are unlikely but not excluded; the ledger rejects a duplicate append.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();
        Self(format!("order_{}_{}", now.timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Receipt reference handed to the payment provider.
    pub fn receipt(&self) -> String {
        format!("receipt_{}", self.0)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Fulfillment status.
///
/// Checkout only ever creates `Processing`. The other states are reached through
/// [`OrderStatus::can_transition_to`]-checked advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Processing, Shipped)
                | (Shipped, Delivered)
                | (Processing, Cancelled)
                | (Shipped, Cancelled)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Completed,
    Failed,
}

/// A purchased line, copied from the cart when the order is placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub total: Decimal,
}

impl OrderItem {
    /// Copies a cart line. `None` if its total overflows.
    pub fn from_line(line: &CartLine) -> Option<Self> {
        Some(Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            price: line.price,
            quantity: line.quantity,
            total: line.line_total()?,
        })
    }
}

/// A placed order. Items, amounts and the shipping address are snapshots: later edits to
/// products or addresses never reach an existing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    /// `total_amount` in minor units, as charged.
    pub amount: i64,
    pub currency: CurrencyCode,
    pub receipt: String,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_id: Option<String>,
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

impl Order {
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// True until a payment has been confirmed for this order.
    pub fn awaiting_payment(&self) -> bool {
        self.status == OrderStatus::Processing
            && self.payment_status != Some(PaymentStatus::Completed)
    }
}

/// Every order one shopper has placed, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLedger {
    pub owner: UserId,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderLedgerCreate;

impl OrderLedger {
    pub fn new(owner: UserId) -> Self {
        Self {
            owner,
            orders: Vec::new(),
        }
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| &o.id == id)
    }
}
