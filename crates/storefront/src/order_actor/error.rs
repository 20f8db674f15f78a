//! Error types for the OrderLedger actor.

use crate::model::OrderStatus;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("No open order ledger for {0}")]
    NotOpen(String),

    #[error("Order already recorded: {0}")]
    DuplicateOrder(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order cannot move from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The local snapshot store failed. The ledger is unchanged.
    #[error("Order ledger persistence failed: {0}")]
    Persistence(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}
