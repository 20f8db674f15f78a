//! The error surfaced by the session facade.

use crate::address_actor::AddressError;
use crate::cart_actor::CartError;
use crate::checkout::CheckoutError;
use crate::favorites_actor::FavoritesError;
use crate::order_actor::OrderError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StorefrontError {
    /// No shopper is signed in, or their aggregates are already closed.
    #[error("Not signed in")]
    Unauthenticated,

    /// The remote collection rejected a write. State is what the last snapshot said.
    #[error("Store write failed: {0}")]
    StoreWriteFailure(StoreError),

    /// The remote collections could not be subscribed to.
    #[error("Remote store unavailable: {0}")]
    StoreUnavailable(StoreError),

    #[error(transparent)]
    Cart(CartError),

    #[error(transparent)]
    Favorites(FavoritesError),

    #[error(transparent)]
    Address(AddressError),

    #[error(transparent)]
    Order(OrderError),

    #[error(transparent)]
    Checkout(CheckoutError),
}

impl From<CartError> for StorefrontError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::NotOpen(_) => StorefrontError::Unauthenticated,
            CartError::Store(e) => StorefrontError::StoreWriteFailure(e),
            other => StorefrontError::Cart(other),
        }
    }
}

impl From<FavoritesError> for StorefrontError {
    fn from(e: FavoritesError) -> Self {
        match e {
            FavoritesError::NotOpen(_) => StorefrontError::Unauthenticated,
            FavoritesError::Store(e) => StorefrontError::StoreWriteFailure(e),
            other => StorefrontError::Favorites(other),
        }
    }
}

impl From<AddressError> for StorefrontError {
    fn from(e: AddressError) -> Self {
        match e {
            AddressError::NotOpen(_) => StorefrontError::Unauthenticated,
            other => StorefrontError::Address(other),
        }
    }
}

impl From<OrderError> for StorefrontError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotOpen(_) => StorefrontError::Unauthenticated,
            other => StorefrontError::Order(other),
        }
    }
}

impl From<CheckoutError> for StorefrontError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Cart(e) => e.into(),
            CheckoutError::Address(e) => e.into(),
            CheckoutError::Order(e) => e.into(),
            other => StorefrontError::Checkout(other),
        }
    }
}
