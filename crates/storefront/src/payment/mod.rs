//! # Payment Widget Seam
//!
//! The storefront never talks to a payment provider's API. It loads the provider's checkout
//! widget, opens it with a [`PaymentRequest`], and waits for exactly one of three callbacks:
//! success (with a payment id), failure (with a description) or dismissal.
//!
//! [`PaymentCallback`] turns those callbacks into a one-shot [`PaymentOutcome`]. Its methods
//! consume it, so a widget cannot report twice. A widget that drops the callback without
//! calling it (the shopper navigated away) is seen by checkout as an abandoned attempt.
//!
//! No callback is verified: a success reported here is trusted as-is.

pub mod scripted;

pub use scripted::*;

use crate::model::{CurrencyCode, OrderId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    /// The widget script could not be loaded or the widget refused to open.
    #[error("Payment widget unavailable: {0}")]
    Unavailable(String),
}

/// Contact details shown pre-filled in the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Everything the widget is opened with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// Amount in minor currency units (paise for INR).
    pub amount_minor: i64,
    pub currency: CurrencyCode,
    /// Merchant name shown in the widget header.
    pub display_name: String,
    pub description: String,
    pub receipt: String,
    pub prefill: Prefill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded { payment_id: String },
    Failed { description: String },
    Dismissed,
}

/// The one-shot callback handed to the widget.
#[derive(Debug)]
pub struct PaymentCallback {
    sender: oneshot::Sender<PaymentOutcome>,
}

impl PaymentCallback {
    /// Creates a callback and the receiver checkout waits on.
    pub fn channel() -> (Self, oneshot::Receiver<PaymentOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    pub fn succeed(self, payment_id: impl Into<String>) {
        self.send(PaymentOutcome::Succeeded {
            payment_id: payment_id.into(),
        });
    }

    pub fn fail(self, description: impl Into<String>) {
        self.send(PaymentOutcome::Failed {
            description: description.into(),
        });
    }

    pub fn dismiss(self) {
        self.send(PaymentOutcome::Dismissed);
    }

    fn send(self, outcome: PaymentOutcome) {
        if self.sender.send(outcome).is_err() {
            tracing::debug!("Payment outcome arrived after checkout stopped listening");
        }
    }
}

/// The embedded checkout widget of a payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Loads the widget script. Called before every checkout attempt.
    async fn load(&self) -> Result<(), PaymentError>;

    /// Opens the widget modally. Returns as soon as it is shown; the outcome arrives later
    /// through `callback`.
    fn open(&self, request: PaymentRequest, callback: PaymentCallback) -> Result<(), PaymentError>;
}

/// What the provider itself says about a payment attempt for an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Captured { payment_id: String },
    Pending,
    Failed { reason: String },
}

/// Read access to the provider's authoritative payment records, used to settle orders whose
/// widget callback never arrived.
#[async_trait]
pub trait PaymentLookup: Send + Sync {
    async fn status(&self, order_id: &OrderId) -> Result<ProviderStatus, PaymentError>;
}
