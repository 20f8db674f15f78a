//! # Checkout Orchestrator
//!
//! One `pay` call runs a checkout attempt through
//! `Idle → ValidatingAddress → AwaitingPaymentWidget → PaymentSucceeded | PaymentFailed | PaymentDismissed`.
//!
//! 1. Resolve and validate the shipping address. Nothing else happens if it is incomplete.
//! 2. Remember it under the legacy single-address key.
//! 3. Load the payment widget.
//! 4. Price the cart: it must have lines and a positive total.
//! 5. Record a `processing` order, before the widget is opened.
//! 6. Open the widget and return. The outcome is settled in the background and reported
//!    through the returned [`CheckoutTicket`], the phase channel and the notifier.
//!
//! A success marks the order paid and clears the cart. A failure or a dismissal leaves the
//! order `processing`; [`Checkout::reconcile`] can settle such orders later against the
//! provider's own records.

pub mod error;
pub mod reconcile;

pub use error::*;
pub use reconcile::*;

use crate::clients::{AddressClient, CartClient, OrderClient};
use crate::model::{
    CurrencyCode, Identity, Order, OrderId, OrderItem, OrderStatus, PaymentStatus,
    ShippingAddress, UserId,
};
use crate::notify::Notifier;
use crate::payment::{PaymentCallback, PaymentGateway, PaymentOutcome, PaymentRequest, Prefill};
use crate::store::{load_json, save_json, SnapshotKey, SnapshotStore};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

const PAYMENT_DESCRIPTION: &str = "Payment for your order";
const FALLBACK_CUSTOMER_NAME: &str = "Customer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    ValidatingAddress,
    AwaitingPaymentWidget,
    PaymentSucceeded,
    PaymentFailed,
    PaymentDismissed,
}

/// Which address to ship to.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressSelection {
    /// A saved address by id.
    Saved(String),
    /// The book's default, falling back to the legacy single saved address.
    Default,
    /// Entered by hand for this order.
    Manual(ShippingAddress),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Confirmed { order_id: OrderId, payment_id: String },
    Failed { order_id: OrderId, description: String },
    Dismissed { order_id: OrderId },
    /// The widget went away without calling back.
    Abandoned { order_id: OrderId },
}

/// A checkout attempt whose widget is open.
#[derive(Debug)]
pub struct CheckoutTicket {
    pub order_id: OrderId,
    outcome: JoinHandle<CheckoutOutcome>,
}

impl CheckoutTicket {
    /// Waits for the widget's verdict and its bookkeeping to finish.
    pub async fn outcome(self) -> CheckoutOutcome {
        match self.outcome.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(order_id = %self.order_id, error = %e, "Payment settlement task failed");
                CheckoutOutcome::Abandoned {
                    order_id: self.order_id,
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub currency: CurrencyCode,
    pub merchant_name: String,
}

#[derive(Clone)]
pub struct Checkout {
    cart: CartClient,
    addresses: AddressClient,
    orders: OrderClient,
    local: Arc<dyn SnapshotStore>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Notifier,
    settings: CheckoutSettings,
    phase: Arc<watch::Sender<CheckoutPhase>>,
}

impl Checkout {
    pub fn new(
        cart: CartClient,
        addresses: AddressClient,
        orders: OrderClient,
        local: Arc<dyn SnapshotStore>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Notifier,
        settings: CheckoutSettings,
    ) -> Self {
        let (phase, _) = watch::channel(CheckoutPhase::Idle);
        Self {
            cart,
            addresses,
            orders,
            local,
            gateway,
            notifier,
            settings,
            phase: Arc::new(phase),
        }
    }

    pub fn phase(&self) -> CheckoutPhase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<CheckoutPhase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: CheckoutPhase) {
        self.phase.send_replace(phase);
    }

    /// Starts a checkout attempt for `identity`.
    ///
    /// Returns once the payment widget is open. Any error before that point returns the
    /// phase to `Idle`.
    #[instrument(skip(self, identity), fields(user = %identity.uid))]
    pub async fn pay(
        &self,
        identity: &Identity,
        selection: AddressSelection,
    ) -> Result<CheckoutTicket, CheckoutError> {
        let result = self.start(identity, selection).await;
        if let Err(e) = &result {
            warn!(error = %e, "Checkout stopped");
            self.enter(CheckoutPhase::Idle);
        }
        result
    }

    async fn start(
        &self,
        identity: &Identity,
        selection: AddressSelection,
    ) -> Result<CheckoutTicket, CheckoutError> {
        let owner = identity.uid.clone();

        self.enter(CheckoutPhase::ValidatingAddress);
        let shipping = self.resolve_address(&owner, selection).await?;
        let missing = shipping.missing_fields();
        if !missing.is_empty() {
            return Err(CheckoutError::IncompleteAddress {
                missing: missing.into_iter().map(str::to_string).collect(),
            });
        }
        self.remember_address(&owner, &shipping).await;

        self.gateway
            .load()
            .await
            .map_err(|e| CheckoutError::PaymentWidgetUnavailable(e.to_string()))?;

        let order = self.price_cart(&owner, shipping).await?;
        let order_id = self.orders.append(owner.clone(), order.clone()).await?;

        let request = PaymentRequest {
            amount_minor: order.amount,
            currency: order.currency,
            display_name: self.settings.merchant_name.clone(),
            description: PAYMENT_DESCRIPTION.to_string(),
            receipt: order.receipt.clone(),
            prefill: prefill_for(identity, &order.shipping_address),
        };
        let (callback, verdict) = PaymentCallback::channel();
        self.enter(CheckoutPhase::AwaitingPaymentWidget);
        // The order stays recorded even if the widget refuses to open
        self.gateway
            .open(request, callback)
            .map_err(|e| CheckoutError::PaymentWidgetUnavailable(e.to_string()))?;
        info!(
            %order_id,
            amount = order.amount,
            currency = %order.currency,
            "Payment widget opened"
        );

        let checkout = self.clone();
        let settled_id = order_id.clone();
        let outcome =
            tokio::spawn(async move { checkout.settle(owner, settled_id, verdict).await });

        Ok(CheckoutTicket { order_id, outcome })
    }

    async fn resolve_address(
        &self,
        owner: &UserId,
        selection: AddressSelection,
    ) -> Result<ShippingAddress, CheckoutError> {
        match selection {
            AddressSelection::Manual(shipping) => Ok(shipping),
            AddressSelection::Saved(id) => {
                let book = self.addresses.book(owner.clone()).await?;
                book.get(&id)
                    .map(|a| a.shipping.clone())
                    .ok_or(CheckoutError::AddressNotFound(id))
            }
            AddressSelection::Default => {
                let book = self.addresses.book(owner.clone()).await?;
                if let Some(address) = book.default_address() {
                    return Ok(address.shipping.clone());
                }
                let key = SnapshotKey::LegacyAddress.for_user(owner);
                match load_json::<ShippingAddress>(self.local.as_ref(), &key).await {
                    Ok(Some(shipping)) => Ok(shipping),
                    Ok(None) => Err(CheckoutError::AddressNotFound("default".to_string())),
                    Err(e) => {
                        warn!(error = %e, "Legacy address unreadable");
                        Err(CheckoutError::AddressNotFound("default".to_string()))
                    }
                }
            }
        }
    }

    async fn remember_address(&self, owner: &UserId, shipping: &ShippingAddress) {
        let key = SnapshotKey::LegacyAddress.for_user(owner);
        if let Err(e) = save_json(self.local.as_ref(), &key, shipping).await {
            warn!(error = %e, "Could not remember checkout address");
        }
    }

    async fn price_cart(
        &self,
        owner: &UserId,
        shipping: ShippingAddress,
    ) -> Result<Order, CheckoutError> {
        let cart = self.cart.cart(owner.clone()).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total = cart.total_price().ok_or(CheckoutError::AmountOverflow)?;
        let items = cart
            .lines
            .iter()
            .map(OrderItem::from_line)
            .collect::<Option<Vec<_>>>()
            .ok_or(CheckoutError::AmountOverflow)?;
        if total <= Decimal::ZERO {
            return Err(CheckoutError::InvalidAmount(total));
        }
        let amount = self
            .settings
            .currency
            .to_minor_units(total)
            .filter(|minor| *minor > 0)
            .ok_or(CheckoutError::InvalidAmount(total))?;

        let now = Utc::now();
        let id = OrderId::generate(now);
        Ok(Order {
            receipt: id.receipt(),
            id,
            created_at: now,
            items,
            total_amount: total,
            amount,
            currency: self.settings.currency,
            shipping_address: shipping,
            status: OrderStatus::Processing,
            payment_id: None,
            payment_status: None,
        })
    }

    async fn settle(
        &self,
        owner: UserId,
        order_id: OrderId,
        verdict: oneshot::Receiver<PaymentOutcome>,
    ) -> CheckoutOutcome {
        match verdict.await {
            Ok(PaymentOutcome::Succeeded { payment_id }) => {
                info!(%order_id, %payment_id, "Payment succeeded");
                match self
                    .orders
                    .update_payment(
                        owner.clone(),
                        order_id.clone(),
                        Some(payment_id.clone()),
                        PaymentStatus::Completed,
                    )
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => warn!(%order_id, "Paid order missing from ledger"),
                    Err(e) => {
                        error!(%order_id, error = %e, "Could not record payment");
                        self.notifier
                            .error("Payment verification failed. Please contact support.");
                    }
                }
                if let Err(e) = self.cart.clear(owner).await {
                    warn!(%order_id, error = %e, "Could not clear cart after payment");
                }
                self.enter(CheckoutPhase::PaymentSucceeded);
                self.notifier.success("Payment successful");
                CheckoutOutcome::Confirmed {
                    order_id,
                    payment_id,
                }
            }
            Ok(PaymentOutcome::Failed { description }) => {
                warn!(%order_id, %description, "Payment failed");
                self.enter(CheckoutPhase::PaymentFailed);
                self.notifier.error(format!("Payment failed: {description}"));
                CheckoutOutcome::Failed {
                    order_id,
                    description,
                }
            }
            Ok(PaymentOutcome::Dismissed) => {
                info!(%order_id, "Payment widget dismissed");
                self.enter(CheckoutPhase::PaymentDismissed);
                CheckoutOutcome::Dismissed { order_id }
            }
            Err(_) => {
                warn!(%order_id, "Payment widget closed without a verdict");
                self.enter(CheckoutPhase::Idle);
                CheckoutOutcome::Abandoned { order_id }
            }
        }
    }
}

fn prefill_for(identity: &Identity, shipping: &ShippingAddress) -> Prefill {
    let name = if !shipping.full_name.trim().is_empty() {
        shipping.full_name.clone()
    } else {
        identity
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_CUSTOMER_NAME.to_string())
    };
    Prefill {
        name,
        email: identity.email.clone().unwrap_or_default(),
        contact: shipping.phone.clone(),
    }
}
