//! Error types for the Cart actor.

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    /// No cart is open for this shopper (signed out, or never signed in).
    #[error("No open cart for {0}")]
    NotOpen(String),

    /// `set_quantity` on a product that isn't in the cart.
    #[error("Product not in cart: {0}")]
    LineNotFound(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// The remote collection rejected a read or write. Local state is unchanged.
    #[error("Cart store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cart line could not be encoded: {0}")]
    Encoding(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for CartError {
    fn from(msg: String) -> Self {
        CartError::ActorCommunicationError(msg)
    }
}
