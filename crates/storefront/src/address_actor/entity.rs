//! [`ActorEntity`] implementation for [`AddressBook`].
//!
//! Every action works on a copy of the book, persists the copy, and only then commits it, so a
//! failed write leaves the in-memory book exactly as stored.

use super::actions::{AddressAction, AddressActionResult, AddressBookReload};
use super::error::AddressError;
use crate::model::{Address, AddressBook, AddressBookCreate, UserId};
use crate::store::{
    load_json, quarantine, save_json, SnapshotError, SnapshotKey, SnapshotStore,
};
use actor_framework::ActorEntity;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};

impl AddressBook {
    async fn load(owner: &UserId, store: &dyn SnapshotStore) -> Result<Vec<Address>, AddressError> {
        let key = SnapshotKey::Addresses.for_user(owner);
        match load_json::<Vec<Address>>(store, &key).await {
            Ok(addresses) => Ok(addresses.unwrap_or_default()),
            Err(SnapshotError::Corrupt { key, source }) => {
                let backup = quarantine(store, &key)
                    .await
                    .map_err(|e| AddressError::Persistence(e.to_string()))?;
                error!(
                    %key,
                    %backup,
                    error = %source,
                    "Stored address book is corrupt, moved aside, starting empty"
                );
                Ok(Vec::new())
            }
            Err(e) => Err(AddressError::Persistence(e.to_string())),
        }
    }

    async fn persist(&self, store: &dyn SnapshotStore) -> Result<(), AddressError> {
        let key = SnapshotKey::Addresses.for_user(&self.owner);
        save_json(store, &key, &self.addresses)
            .await
            .map_err(|e| AddressError::Persistence(e.to_string()))
    }
}

#[async_trait]
impl ActorEntity for AddressBook {
    type Id = UserId;
    type Create = AddressBookCreate;
    type Update = AddressBookReload;
    type Action = AddressAction;
    type ActionResult = AddressActionResult;
    type Context = Arc<dyn SnapshotStore>;
    type Error = AddressError;

    fn from_create_params(owner: UserId, _params: AddressBookCreate) -> Result<Self, Self::Error> {
        Ok(AddressBook::new(owner))
    }

    async fn on_create(&mut self, store: &Self::Context) -> Result<(), Self::Error> {
        let addresses = Self::load(&self.owner, store.as_ref()).await?;
        *self = AddressBook::from_stored(self.owner.clone(), addresses);
        Ok(())
    }

    async fn on_update(
        &mut self,
        _reload: AddressBookReload,
        store: &Self::Context,
    ) -> Result<(), Self::Error> {
        let addresses = Self::load(&self.owner, store.as_ref()).await?;
        *self = AddressBook::from_stored(self.owner.clone(), addresses);
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: AddressAction,
        store: &Self::Context,
    ) -> Result<AddressActionResult, Self::Error> {
        let mut next = self.clone();
        let result = match action {
            AddressAction::Upsert(address) => AddressActionResult::Upsert(next.upsert(address)),
            AddressAction::Remove(id) => {
                let removed = next.remove(&id);
                if removed.is_none() {
                    return Ok(AddressActionResult::Remove(None));
                }
                AddressActionResult::Remove(removed)
            }
            AddressAction::SetDefault(id) => {
                if !next.set_default(&id) {
                    warn!(owner = %self.owner, address_id = %id, "set_default on unknown address");
                    return Ok(AddressActionResult::SetDefault(false));
                }
                AddressActionResult::SetDefault(true)
            }
        };

        next.persist(store.as_ref()).await?;
        *self = next;
        Ok(result)
    }
}
