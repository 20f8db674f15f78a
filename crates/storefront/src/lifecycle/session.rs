//! Shopper-facing operations on the signed-in session.
//!
//! Each operation resolves the current identity first. Without one it fails with
//! [`StorefrontError::Unauthenticated`] and changes nothing; the cart and favorites adds also
//! ask the shopper to log in.

use super::StorefrontSystem;
use crate::checkout::{AddressSelection, CheckoutError, CheckoutTicket, ReconcileReport};
use crate::error::StorefrontError;
use crate::model::{
    Address, CartLine, CartTotals, FavoriteEntry, Identity, Order, OrderId, OrderStatus, Product,
    ProductId,
};
use crate::payment::PaymentLookup;
use tracing::warn;

impl StorefrontSystem {
    async fn require_identity(&self, denied: Option<&str>) -> Result<Identity, StorefrontError> {
        match self.current_identity().await {
            Some(identity) => Ok(identity),
            None => {
                if let Some(message) = denied {
                    self.notifier.error(message);
                }
                Err(StorefrontError::Unauthenticated)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    pub async fn add_to_cart(&self, product: Product) -> Result<CartLine, StorefrontError> {
        let identity = self
            .require_identity(Some("Please login to add items to cart"))
            .await?;
        match self.cart.add(identity.uid, product).await {
            Ok((line, merged)) => {
                if merged {
                    self.notifier.success("Item quantity updated in cart");
                } else {
                    self.notifier.success("Item added to cart");
                }
                Ok(line)
            }
            Err(e) => {
                warn!(error = %e, "Add to cart failed");
                self.notifier.error("Failed to add item to cart");
                Err(e.into())
            }
        }
    }

    pub async fn update_quantity(
        &self,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Option<CartLine>, StorefrontError> {
        let identity = self.require_identity(None).await?;
        self.cart
            .set_quantity(identity.uid, product_id, quantity)
            .await
            .map_err(|e| {
                warn!(error = %e, "Quantity update failed");
                self.notifier.error("Failed to update quantity");
                e.into()
            })
    }

    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<bool, StorefrontError> {
        let identity = self.require_identity(None).await?;
        match self.cart.remove(identity.uid, product_id).await {
            Ok(removed) => {
                if removed {
                    self.notifier.success("Item removed from cart");
                }
                Ok(removed)
            }
            Err(e) => {
                warn!(error = %e, "Remove from cart failed");
                self.notifier.error("Failed to remove item from cart");
                Err(e.into())
            }
        }
    }

    pub async fn clear_cart(&self) -> Result<usize, StorefrontError> {
        let identity = self.require_identity(None).await?;
        match self.cart.clear(identity.uid).await {
            Ok(cleared) => {
                self.notifier.success("Cart cleared");
                Ok(cleared)
            }
            Err(e) => {
                warn!(error = %e, "Clear cart failed");
                self.notifier.error("Failed to clear cart");
                Err(e.into())
            }
        }
    }

    pub async fn cart_lines(&self) -> Result<Vec<CartLine>, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.cart.lines(identity.uid).await?)
    }

    pub async fn cart_totals(&self) -> Result<CartTotals, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.cart.totals(identity.uid).await?)
    }

    // -------------------------------------------------------------------------
    // Favorites
    // -------------------------------------------------------------------------

    pub async fn toggle_favorite(&self, product: Product) -> Result<bool, StorefrontError> {
        let identity = self
            .require_identity(Some("Please login to add favorites"))
            .await?;
        let was_favorite = self
            .favorites
            .is_favorite(identity.uid.clone(), &product.id)
            .await?;
        match self.favorites.toggle(identity.uid, product).await {
            Ok(true) => {
                self.notifier.success("Added to favorites");
                Ok(true)
            }
            Ok(false) => {
                self.notifier.success("Removed from favorites");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Favorite toggle failed");
                if was_favorite {
                    self.notifier.error("Failed to remove from favorites");
                } else {
                    self.notifier.error("Failed to add to favorites");
                }
                Err(e.into())
            }
        }
    }

    pub async fn add_favorite(&self, product: Product) -> Result<bool, StorefrontError> {
        let identity = self
            .require_identity(Some("Please login to add favorites"))
            .await?;
        match self.favorites.add(identity.uid, product).await {
            Ok(changed) => {
                self.notifier.success("Added to favorites");
                Ok(changed)
            }
            Err(e) => {
                warn!(error = %e, "Add favorite failed");
                self.notifier.error("Failed to add to favorites");
                Err(e.into())
            }
        }
    }

    pub async fn remove_favorite(&self, product_id: ProductId) -> Result<bool, StorefrontError> {
        let identity = self.require_identity(None).await?;
        match self.favorites.remove(identity.uid, product_id).await {
            Ok(changed) => {
                self.notifier.success("Removed from favorites");
                Ok(changed)
            }
            Err(e) => {
                warn!(error = %e, "Remove favorite failed");
                self.notifier.error("Failed to remove from favorites");
                Err(e.into())
            }
        }
    }

    /// False when signed out.
    pub async fn is_favorite(&self, product_id: &ProductId) -> bool {
        let Some(identity) = self.current_identity().await else {
            return false;
        };
        self.favorites
            .is_favorite(identity.uid, product_id)
            .await
            .unwrap_or(false)
    }

    pub async fn favorite_entries(&self) -> Result<Vec<FavoriteEntry>, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.favorites.list(identity.uid).await?)
    }

    // -------------------------------------------------------------------------
    // Address book
    // -------------------------------------------------------------------------

    pub async fn save_address(&self, address: Address) -> Result<Address, StorefrontError> {
        let identity = self.require_identity(None).await?;
        self.addresses
            .upsert(identity.uid, address)
            .await
            .map_err(|e| {
                warn!(error = %e, "Save address failed");
                self.notifier.error("Failed to save address. Please try again.");
                e.into()
            })
    }

    pub async fn remove_address(&self, id: String) -> Result<Option<Address>, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.addresses.remove(identity.uid, id).await?)
    }

    pub async fn set_default_address(&self, id: String) -> Result<bool, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.addresses.set_default(identity.uid, id).await?)
    }

    pub async fn saved_addresses(&self) -> Result<Vec<Address>, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.addresses.list(identity.uid).await?)
    }

    // -------------------------------------------------------------------------
    // Orders & checkout
    // -------------------------------------------------------------------------

    pub async fn order_history(&self) -> Result<Vec<Order>, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.orders.orders(identity.uid).await?)
    }

    pub async fn order(&self, order_id: &OrderId) -> Result<Option<Order>, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.orders.order(identity.uid, order_id).await?)
    }

    pub async fn advance_order(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.orders.advance(identity.uid, order_id, status).await?)
    }

    /// Starts a checkout for the signed-in shopper. See [`Checkout::pay`](crate::checkout::Checkout::pay).
    pub async fn place_order(
        &self,
        selection: AddressSelection,
    ) -> Result<CheckoutTicket, StorefrontError> {
        let identity = self.require_identity(None).await?;
        self.checkout.pay(&identity, selection).await.map_err(|e| {
            match &e {
                CheckoutError::IncompleteAddress { .. } => {
                    self.notifier.error("Please fill in all address fields");
                }
                CheckoutError::PaymentWidgetUnavailable(_) => {
                    self.notifier
                        .error("Failed to load payment gateway. Please try again.");
                }
                other => self.notifier.error(format!("Payment failed: {other}")),
            }
            e.into()
        })
    }

    pub async fn reconcile_payments(
        &self,
        lookup: &dyn PaymentLookup,
    ) -> Result<ReconcileReport, StorefrontError> {
        let identity = self.require_identity(None).await?;
        Ok(self.checkout.reconcile(&identity, lookup).await?)
    }
}
