//! # Order Ledger Actor
//!
//! Append-only record of one shopper's orders, persisted locally under `<user>/userOrders`.
//! Orders are never deleted. Checkout appends a `processing` order before the payment widget
//! opens; the payment callback (or the reconciliation job) then records the payment on it.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::OrderClient;
use crate::model::OrderLedger;
use actor_framework::ResourceActor;

/// Creates a new OrderLedger actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<OrderLedger>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    let client = OrderClient::new(generic_client);

    (actor, client)
}
