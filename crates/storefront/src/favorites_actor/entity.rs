//! [`ActorEntity`] implementation for [`Favorites`].

use super::actions::{FavoritesAction, FavoritesActionResult};
use super::error::FavoritesError;
use crate::model::{FavoriteEntry, Favorites, FavoritesCreate, Product, ProductId, UserId};
use crate::store::{CollectionName, CollectionSnapshot, CollectionStore};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

impl Favorites {
    pub(crate) fn apply_snapshot(&mut self, snapshot: CollectionSnapshot) -> bool {
        if snapshot.revision < self.revision {
            debug!(
                owner = %self.owner,
                stale = snapshot.revision,
                current = self.revision,
                "Ignoring stale favorites snapshot"
            );
            return false;
        }

        let mut entries: Vec<FavoriteEntry> = Vec::with_capacity(snapshot.documents.len());
        for (doc_id, mut entry) in snapshot.decode::<FavoriteEntry>() {
            entry.product_id = ProductId(doc_id);
            if !entries.iter().any(|e| e.product_id == entry.product_id) {
                entries.push(entry);
            }
        }
        self.entries = entries;
        self.revision = snapshot.revision;
        true
    }

    async fn insert(
        &mut self,
        store: &dyn CollectionStore,
        product: &Product,
    ) -> Result<bool, FavoritesError> {
        if self.contains(&product.id) {
            return Ok(false);
        }
        let entry = FavoriteEntry::from_product(product, Utc::now());
        let fields =
            serde_json::to_value(&entry).map_err(|e| FavoritesError::Encoding(e.to_string()))?;
        let revision = store
            .upsert(&self.owner, CollectionName::Favorites, product.id.as_str(), fields)
            .await?;
        self.entries.push(entry);
        self.revision = self.revision.max(revision);
        Ok(true)
    }

    async fn erase(
        &mut self,
        store: &dyn CollectionStore,
        product_id: &ProductId,
    ) -> Result<bool, FavoritesError> {
        if !self.contains(product_id) {
            return Ok(false);
        }
        let revision = store
            .delete(&self.owner, CollectionName::Favorites, product_id.as_str())
            .await?;
        self.entries.retain(|e| &e.product_id != product_id);
        self.revision = self.revision.max(revision);
        Ok(true)
    }
}

#[async_trait]
impl ActorEntity for Favorites {
    type Id = UserId;
    type Create = FavoritesCreate;
    type Update = CollectionSnapshot;
    type Action = FavoritesAction;
    type ActionResult = FavoritesActionResult;
    type Context = Arc<dyn CollectionStore>;
    type Error = FavoritesError;

    fn from_create_params(owner: UserId, _params: FavoritesCreate) -> Result<Self, Self::Error> {
        Ok(Favorites::new(owner))
    }

    async fn on_create(&mut self, store: &Self::Context) -> Result<(), Self::Error> {
        let snapshot = store.snapshot(&self.owner, CollectionName::Favorites).await?;
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
        action: FavoritesAction,
        store: &Self::Context,
    ) -> Result<FavoritesActionResult, Self::Error> {
        match action {
            FavoritesAction::Toggle(product) => {
                if self.contains(&product.id) {
                    self.erase(store.as_ref(), &product.id).await?;
                    Ok(FavoritesActionResult::Toggle(false))
                } else {
                    self.insert(store.as_ref(), &product).await?;
                    Ok(FavoritesActionResult::Toggle(true))
                }
            }
            FavoritesAction::Add(product) => {
                let changed = self.insert(store.as_ref(), &product).await?;
                Ok(FavoritesActionResult::Add(changed))
            }
            FavoritesAction::Remove(product_id) => {
                let changed = self.erase(store.as_ref(), &product_id).await?;
                Ok(FavoritesActionResult::Remove(changed))
            }
        }
    }
}
