use crate::favorites_actor::{FavoritesAction, FavoritesActionResult, FavoritesError};
use crate::model::{FavoriteEntry, Favorites, FavoritesCreate, Product, ProductId, UserId};
use crate::store::CollectionSnapshot;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Favorites actor.
#[derive(Clone)]
pub struct FavoritesClient {
    inner: ResourceClient<Favorites>,
}

impl FavoritesClient {
    pub fn new(inner: ResourceClient<Favorites>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Favorites> for FavoritesClient {
    type Error = FavoritesError;

    fn inner(&self) -> &ResourceClient<Favorites> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<FavoritesError>() {
            Ok(e) => e,
            Err(FrameworkError::NotFound(id)) => FavoritesError::NotOpen(id),
            Err(e) => FavoritesError::ActorCommunicationError(e.to_string()),
        }
    }
}

impl FavoritesClient {
    #[instrument(skip(self))]
    pub async fn open(&self, owner: UserId) -> Result<(), FavoritesError> {
        debug!("Sending request");
        self.inner
            .create(owner, FavoritesCreate)
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    pub async fn close(&self, owner: UserId) -> Result<(), FavoritesError> {
        self.delete(owner).await
    }

    async fn act(
        &self,
        owner: UserId,
        action: FavoritesAction,
    ) -> Result<FavoritesActionResult, FavoritesError> {
        self.inner
            .perform_action(owner, action)
            .await
            .map_err(Self::map_error)
    }

    /// Flips membership. Returns whether the product is a favorite afterwards.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle(&self, owner: UserId, product: Product) -> Result<bool, FavoritesError> {
        debug!("Sending request");
        match self.act(owner, FavoritesAction::Toggle(product)).await? {
            FavoritesActionResult::Toggle(now_favorite) => Ok(now_favorite),
            other => Err(FavoritesError::ActorCommunicationError(format!(
                "Unexpected action result: {other:?}"
            ))),
        }
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, owner: UserId, product: Product) -> Result<bool, FavoritesError> {
        debug!("Sending request");
        match self.act(owner, FavoritesAction::Add(product)).await? {
            FavoritesActionResult::Add(changed) => Ok(changed),
            other => Err(FavoritesError::ActorCommunicationError(format!(
                "Unexpected action result: {other:?}"
            ))),
        }
    }

    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        owner: UserId,
        product_id: ProductId,
    ) -> Result<bool, FavoritesError> {
        debug!("Sending request");
        match self.act(owner, FavoritesAction::Remove(product_id)).await? {
            FavoritesActionResult::Remove(changed) => Ok(changed),
            other => Err(FavoritesError::ActorCommunicationError(format!(
                "Unexpected action result: {other:?}"
            ))),
        }
    }

    #[instrument(skip(self, snapshot), fields(revision = snapshot.revision))]
    pub async fn apply_snapshot(
        &self,
        owner: UserId,
        snapshot: CollectionSnapshot,
    ) -> Result<Favorites, FavoritesError> {
        debug!("Sending request");
        self.inner
            .update(owner, snapshot)
            .await
            .map_err(Self::map_error)
    }

    pub async fn favorites(&self, owner: UserId) -> Result<Favorites, FavoritesError> {
        let key = owner.to_string();
        self.get(owner).await?.ok_or(FavoritesError::NotOpen(key))
    }

    pub async fn is_favorite(
        &self,
        owner: UserId,
        product_id: &ProductId,
    ) -> Result<bool, FavoritesError> {
        Ok(self.favorites(owner).await?.contains(product_id))
    }

    pub async fn list(&self, owner: UserId) -> Result<Vec<FavoriteEntry>, FavoritesError> {
        Ok(self.favorites(owner).await?.entries)
    }
}
