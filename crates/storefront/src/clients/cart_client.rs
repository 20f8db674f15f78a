use crate::cart_actor::{CartAction, CartActionResult, CartError};
use crate::model::{Cart, CartCreate, CartLine, CartTotals, Product, ProductId, UserId};
use crate::store::CollectionSnapshot;
use actor_framework::{ActorClient, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for interacting with the Cart actor.
///
/// Carts are keyed by the shopper's [`UserId`]. Every call on a shopper without an open cart
/// fails with [`CartError::NotOpen`].
#[derive(Clone)]
pub struct CartClient {
    inner: ResourceClient<Cart>,
}

impl CartClient {
    pub fn new(inner: ResourceClient<Cart>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Cart> for CartClient {
    type Error = CartError;

    fn inner(&self) -> &ResourceClient<Cart> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e.into_entity_error::<CartError>() {
            Ok(e) => e,
            Err(FrameworkError::NotFound(id)) => CartError::NotOpen(id),
            Err(e) => CartError::ActorCommunicationError(e.to_string()),
        }
    }
}

fn unexpected(result: CartActionResult) -> CartError {
    CartError::ActorCommunicationError(format!("Unexpected action result: {result:?}"))
}

impl CartClient {
    /// Opens the shopper's cart, loading the remote collection.
    #[instrument(skip(self))]
    pub async fn open(&self, owner: UserId) -> Result<(), CartError> {
        debug!("Sending request");
        self.inner
            .create(owner, CartCreate)
            .await
            .map(|_| ())
            .map_err(Self::map_error)
    }

    /// Drops the in-memory cart. The remote collection is left alone.
    #[instrument(skip(self))]
    pub async fn close(&self, owner: UserId) -> Result<(), CartError> {
        self.delete(owner).await
    }

    /// Adds one unit of `product`. Returns the resulting line and whether it merged.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(
        &self,
        owner: UserId,
        product: Product,
    ) -> Result<(CartLine, bool), CartError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(owner, CartAction::Add(product))
            .await
            .map_err(Self::map_error)?
        {
            CartActionResult::Add { line, merged } => Ok((line, merged)),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        owner: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Option<CartLine>, CartError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(owner, CartAction::SetQuantity { product_id, quantity })
            .await
            .map_err(Self::map_error)?
        {
            CartActionResult::SetQuantity(line) => Ok(line),
            other => Err(unexpected(other)),
        }
    }

    /// Removes a line. Returns false if there was nothing to remove.
    #[instrument(skip(self))]
    pub async fn remove(&self, owner: UserId, product_id: ProductId) -> Result<bool, CartError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(owner, CartAction::Remove(product_id))
            .await
            .map_err(Self::map_error)?
        {
            CartActionResult::Remove(removed) => Ok(removed),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, owner: UserId) -> Result<usize, CartError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(owner, CartAction::Clear)
            .await
            .map_err(Self::map_error)?
        {
            CartActionResult::Clear(count) => Ok(count),
            other => Err(unexpected(other)),
        }
    }

    /// Feeds a snapshot from the remote subscription into the cart.
    #[instrument(skip(self, snapshot), fields(revision = snapshot.revision))]
    pub async fn apply_snapshot(
        &self,
        owner: UserId,
        snapshot: CollectionSnapshot,
    ) -> Result<Cart, CartError> {
        debug!("Sending request");
        self.inner
            .update(owner, snapshot)
            .await
            .map_err(Self::map_error)
    }

    /// The open cart.
    pub async fn cart(&self, owner: UserId) -> Result<Cart, CartError> {
        let key = owner.to_string();
        self.get(owner).await?.ok_or(CartError::NotOpen(key))
    }

    pub async fn lines(&self, owner: UserId) -> Result<Vec<CartLine>, CartError> {
        Ok(self.cart(owner).await?.lines)
    }

    pub async fn totals(&self, owner: UserId) -> Result<CartTotals, CartError> {
        Ok(self.cart(owner).await?.totals())
    }
}
