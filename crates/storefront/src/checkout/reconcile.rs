//! Settling orders whose widget callback never arrived.

use super::{Checkout, CheckoutError};
use crate::model::{Identity, OrderId, PaymentStatus};
use crate::payment::{PaymentLookup, ProviderStatus};
use tracing::{info, instrument, warn};

/// What one reconciliation pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Orders now marked paid.
    pub completed: Vec<OrderId>,
    /// Orders the provider reports as failed.
    pub failed: Vec<OrderId>,
    /// Still open at the provider, or not answerable right now.
    pub pending: Vec<OrderId>,
}

impl Checkout {
    /// Asks the provider about every order still awaiting payment and records what it knows.
    ///
    /// Captured payments complete the order. The cart is not touched: it may already hold the
    /// shopper's next purchase.
    #[instrument(skip(self, identity, lookup), fields(user = %identity.uid))]
    pub async fn reconcile(
        &self,
        identity: &Identity,
        lookup: &dyn PaymentLookup,
    ) -> Result<ReconcileReport, CheckoutError> {
        let owner = identity.uid.clone();
        let open: Vec<_> = self
            .orders
            .orders(owner.clone())
            .await?
            .into_iter()
            .filter(|o| o.awaiting_payment())
            .collect();

        let mut report = ReconcileReport::default();
        for order in open {
            let status = match lookup.status(&order.id).await {
                Ok(status) => status,
                Err(e) => {
                    warn!(order_id = %order.id, error = %e, "Provider lookup failed");
                    report.pending.push(order.id);
                    continue;
                }
            };

            match status {
                ProviderStatus::Captured { payment_id } => {
                    self.orders
                        .update_payment(
                            owner.clone(),
                            order.id.clone(),
                            Some(payment_id),
                            PaymentStatus::Completed,
                        )
                        .await?;
                    report.completed.push(order.id);
                }
                ProviderStatus::Failed { reason } => {
                    if order.payment_status != Some(PaymentStatus::Failed) {
                        info!(order_id = %order.id, %reason, "Marking payment failed");
                        self.orders
                            .update_payment(
                                owner.clone(),
                                order.id.clone(),
                                None,
                                PaymentStatus::Failed,
                            )
                            .await?;
                    }
                    report.failed.push(order.id);
                }
                ProviderStatus::Pending => report.pending.push(order.id),
            }
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            pending = report.pending.len(),
            "Reconciliation pass finished"
        );
        Ok(report)
    }
}
