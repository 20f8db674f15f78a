use crate::address_actor::{AddressAction, AddressActionResult, AddressBookReload, AddressError};
use crate::model::{Address, AddressBook, AddressBookCreate, UserId};
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the AddressBook actor.
#[derive(Clone)]
pub struct AddressClient {
    inner: ResourceClient<AddressBook>,
}

impl AddressClient {
    pub fn new(inner: ResourceClient<AddressBook>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<AddressBook> for AddressClient {
    type Error = AddressError;

    fn inner(&self) -> &ResourceClient<AddressBook> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<AddressError>() {
            Ok(e) => e,
            Err(FrameworkError::NotFound(id)) => AddressError::NotOpen(id),
            Err(e) => AddressError::ActorCommunicationError(e.to_string()),
        }
    }
}

fn unexpected(result: AddressActionResult) -> AddressError {
    AddressError::ActorCommunicationError(format!("Unexpected action result: {result:?}"))
}

impl AddressClient {
    #[instrument(skip(self))]
    pub async fn open(&self, owner: UserId) -> Result<(), AddressError> {
        debug!("Sending request");
        self.inner
            .create(owner, AddressBookCreate)
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    pub async fn close(&self, owner: UserId) -> Result<(), AddressError> {
        self.delete(owner).await
    }

    /// Re-reads the stored snapshot, e.g. after another process wrote it.
    #[instrument(skip(self))]
    pub async fn reload(&self, owner: UserId) -> Result<AddressBook, AddressError> {
        debug!("Sending request");
        self.inner
            .update(owner, AddressBookReload)
            .await
            .map_err(Self::map_error)
    }

    #[instrument(skip(self, address), fields(address_id = %address.id))]
    pub async fn upsert(&self, owner: UserId, address: Address) -> Result<Address, AddressError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(owner, AddressAction::Upsert(address))
            .await
            .map_err(Self::map_error)?
        {
            AddressActionResult::Upsert(stored) => Ok(stored),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, owner: UserId, id: String) -> Result<Option<Address>, AddressError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(owner, AddressAction::Remove(id))
            .await
            .map_err(Self::map_error)?
        {
            AddressActionResult::Remove(removed) => Ok(removed),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn set_default(&self, owner: UserId, id: String) -> Result<bool, AddressError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(owner, AddressAction::SetDefault(id))
            .await
            .map_err(Self::map_error)?
        {
            AddressActionResult::SetDefault(found) => Ok(found),
            other => Err(unexpected(other)),
        }
    }

    pub async fn book(&self, owner: UserId) -> Result<AddressBook, AddressError> {
        let key = owner.to_string();
        self.get(owner).await?.ok_or(AddressError::NotOpen(key))
    }

    /// All addresses in stored order.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Address>, AddressError> {
        Ok(self.book(owner).await?.addresses)
    }

    pub async fn default_address(&self, owner: UserId) -> Result<Option<Address>, AddressError> {
        Ok(self.book(owner).await?.default_address().cloned())
    }
}
