//! [`ActorEntity`] implementation for [`Cart`].
//!
//! The cart is a mirror of the shopper's remote `cart` collection. Mutations write the
//! document first and only touch the in-memory lines once the store has accepted the write,
//! taking the store's new revision along. Snapshots pushed by the collection subscription
//! arrive as updates and replace the lines wholesale unless they are older than what the cart
//! already reflects.

use super::actions::{CartAction, CartActionResult};
use super::error::CartError;
use crate::model::{Cart, CartCreate, CartLine, ProductId, UserId};
use crate::store::{CollectionName, CollectionSnapshot, CollectionStore};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

impl Cart {
    /// Replaces the lines with a snapshot's, unless the snapshot is stale.
    pub(crate) fn apply_snapshot(&mut self, snapshot: CollectionSnapshot) -> bool {
        if snapshot.revision < self.revision {
            debug!(
                owner = %self.owner,
                stale = snapshot.revision,
                current = self.revision,
                "Ignoring stale cart snapshot"
            );
            return false;
        }

        let mut lines: Vec<CartLine> = Vec::with_capacity(snapshot.documents.len());
        for (doc_id, mut line) in snapshot.decode::<CartLine>() {
            // The document id is the product id; the body copy is informational
            line.product_id = ProductId(doc_id);
            if line.quantity == 0 {
                warn!(
                    owner = %self.owner,
                    product_id = %line.product_id,
                    "Dropping zero-quantity line"
                );
                continue;
            }
            match lines.iter_mut().find(|l| l.product_id == line.product_id) {
                Some(existing) => *existing = line,
                None => lines.push(line),
            }
        }
        self.lines = lines;
        self.revision = snapshot.revision;
        true
    }

    async fn write_line(
        &mut self,
        store: &dyn CollectionStore,
        line: CartLine,
    ) -> Result<CartLine, CartError> {
        let fields = serde_json::to_value(&line).map_err(|e| CartError::Encoding(e.to_string()))?;
        let revision = store
            .upsert(&self.owner, CollectionName::Cart, line.product_id.as_str(), fields)
            .await?;

        match self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => *existing = line.clone(),
            None => self.lines.push(line.clone()),
        }
        self.revision = self.revision.max(revision);
        Ok(line)
    }

    async fn delete_line(
        &mut self,
        store: &dyn CollectionStore,
        product_id: &ProductId,
    ) -> Result<(), CartError> {
        let revision = store
            .delete(&self.owner, CollectionName::Cart, product_id.as_str())
            .await?;
        self.lines.retain(|l| &l.product_id != product_id);
        self.revision = self.revision.max(revision);
        Ok(())
    }
}

#[async_trait]
impl ActorEntity for Cart {
    type Id = UserId;
    type Create = CartCreate;
    type Update = CollectionSnapshot;
    type Action = CartAction;
    type ActionResult = CartActionResult;
    type Context = Arc<dyn CollectionStore>;
    type Error = CartError;

    fn from_create_params(owner: UserId, _params: CartCreate) -> Result<Self, Self::Error> {
        Ok(Cart::new(owner))
    }

    /// Loads whatever the remote collection already holds for this shopper.
    async fn on_create(&mut self, store: &Self::Context) -> Result<(), Self::Error> {
        let snapshot = store.snapshot(&self.owner, CollectionName::Cart).await?;
        self.apply_snapshot(snapshot);
        Ok(())
    }

    async fn on_update(
        &mut self,
        snapshot: CollectionSnapshot,
        _store: &Self::Context,
    ) -> Result<(), Self::Error> {
        self.apply_snapshot(snapshot);
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: CartAction,
        store: &Self::Context,
    ) -> Result<CartActionResult, Self::Error> {
        match action {
            CartAction::Add(product) => {
                let (line, merged) = match self.line(&product.id) {
                    Some(existing) => {
                        let mut line = existing.clone();
                        line.quantity = line.quantity.saturating_add(1);
                        (line, true)
                    }
                    None => (CartLine::from_product(&product, Utc::now()), false),
                };
                let line = self.write_line(store.as_ref(), line).await?;
                Ok(CartActionResult::Add { line, merged })
            }
            CartAction::SetQuantity {
                product_id,
                quantity,
            } => {
                if quantity <= 0 {
                    if self.line(&product_id).is_some() {
                        self.delete_line(store.as_ref(), &product_id).await?;
                    }
                    return Ok(CartActionResult::SetQuantity(None));
                }

                let quantity =
                    u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))?;
                let Some(existing) = self.line(&product_id) else {
                    return Err(CartError::LineNotFound(product_id.to_string()));
                };
                if existing.quantity == quantity {
                    return Ok(CartActionResult::SetQuantity(Some(existing.clone())));
                }

                let mut line = existing.clone();
                line.quantity = quantity;
                let line = self.write_line(store.as_ref(), line).await?;
                Ok(CartActionResult::SetQuantity(Some(line)))
            }
            CartAction::Remove(product_id) => {
                if self.line(&product_id).is_none() {
                    return Ok(CartActionResult::Remove(false));
                }
                self.delete_line(store.as_ref(), &product_id).await?;
                Ok(CartActionResult::Remove(true))
            }
            CartAction::Clear => {
                let ids: Vec<ProductId> = self.lines.iter().map(|l| l.product_id.clone()).collect();
                for product_id in &ids {
                    // Lines deleted before a failure stay deleted
                    self.delete_line(store.as_ref(), product_id).await?;
                }
                Ok(CartActionResult::Clear(ids.len()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Product;
    use crate::store::Document;
    use rust_decimal::Decimal;

    fn doc(id: &str, quantity: u32) -> Document {
        let product = Product::new(id, "Tea", Decimal::from(10));
        let mut line = CartLine::from_product(&product, Utc::now());
        line.quantity = quantity;
        Document {
            id: id.to_string(),
            fields: serde_json::to_value(line).unwrap(),
        }
    }

    #[test]
    fn test_stale_snapshot_is_ignored() {
        let mut cart = Cart::new(UserId::from("user_1"));
        assert!(cart.apply_snapshot(CollectionSnapshot {
            revision: 2,
            documents: vec![doc("1", 2)],
        }));
        assert!(!cart.apply_snapshot(CollectionSnapshot {
            revision: 1,
            documents: vec![doc("1", 1)],
        }));
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(cart.revision, 2);
    }

    #[test]
    fn test_snapshot_skips_bad_documents() {
        let mut cart = Cart::new(UserId::from("user_1"));
        let bad = Document {
            id: "2".to_string(),
            fields: serde_json::json!({"name": "no price"}),
        };
        cart.apply_snapshot(CollectionSnapshot {
            revision: 1,
            documents: vec![doc("1", 1), bad, doc("3", 0)],
        });
        let ids: Vec<_> = cart.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, ["1"]);
    }
}
