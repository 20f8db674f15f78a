use crate::address_actor::AddressError;
use crate::cart_actor::CartError;
use crate::order_actor::OrderError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why a checkout attempt stopped before the payment widget took over.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Incomplete address, missing: {}", missing.join(", "))]
    IncompleteAddress { missing: Vec<String> },

    #[error("Address not found: {0}")]
    AddressNotFound(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid order amount: {0}")]
    InvalidAmount(Decimal),

    /// A line total or the cart total does not fit in a `Decimal`.
    #[error("Order amount is too large")]
    AmountOverflow,

    #[error("Payment widget unavailable: {0}")]
    PaymentWidgetUnavailable(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Order(#[from] OrderError),
}
