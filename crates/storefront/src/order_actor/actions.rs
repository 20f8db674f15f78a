//! Custom actions for the OrderLedger actor.

use crate::model::{Order, OrderId, OrderStatus, PaymentStatus};

/// Update payload: discard in-memory state and re-read the stored snapshot.
#[derive(Debug, Clone, Default)]
pub struct OrderLedgerReload;

#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Adds a new order. Its id must not already be in the ledger.
    Append(Order),
    /// Records a payment outcome. Unknown ids are logged and ignored.
    UpdatePayment {
        order_id: OrderId,
        payment_id: Option<String>,
        status: PaymentStatus,
    },
    /// Moves an order along its fulfillment lifecycle.
    Advance { order_id: OrderId, status: OrderStatus },
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    Append(OrderId),
    /// Whether the order was found.
    UpdatePayment(bool),
    /// The order after the transition.
    Advance(Order),
}
