//! # ActorClient Trait
//!
//! Common surface for domain clients (cart, favorites, …): default `get`, `delete` and
//! `subscribe` built on top of a generic `ResourceClient`, with framework errors mapped into
//! the domain's own error enum.
use crate::{ActorEntity, FrameworkError, ResourceClient, Subscription};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit standard operations.
///
/// # Example
///
/// ```rust
/// use actor_framework::{ActorClient, ActorEntity, FrameworkError, ResourceClient};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)]
/// struct Wishlist { owner: String, items: Vec<String> }
/// #[derive(Debug)] struct WishlistCreate;
/// #[derive(Debug)] struct WishlistUpdate;
/// #[derive(Debug)] enum WishlistAction {}
///
/// #[derive(Debug, thiserror::Error)]
/// enum WishlistError {
///     #[error("Actor communication error: {0}")]
///     ActorCommunicationError(String),
/// }
///
/// impl From<String> for WishlistError {
///     fn from(s: String) -> Self { WishlistError::ActorCommunicationError(s) }
/// }
///
/// #[async_trait]
/// impl ActorEntity for Wishlist {
///     type Id = String;
///     type Create = WishlistCreate;
///     type Update = WishlistUpdate;
///     type Action = WishlistAction;
///     type ActionResult = ();
///     type Context = ();
///     type Error = WishlistError;
///
///     fn from_create_params(owner: String, _: WishlistCreate) -> Result<Self, Self::Error> {
///         Ok(Self { owner, items: Vec::new() })
///     }
///     async fn on_update(&mut self, _: WishlistUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: WishlistAction, _: &()) -> Result<(), Self::Error> { Ok(()) }
/// }
///
/// struct WishlistClient {
///     inner: ResourceClient<Wishlist>,
/// }
///
/// #[async_trait]
/// impl ActorClient<Wishlist> for WishlistClient {
///     type Error = WishlistError;
///
///     fn inner(&self) -> &ResourceClient<Wishlist> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         WishlistError::ActorCommunicationError(e.to_string())
///     }
/// }
///
/// async fn usage(client: WishlistClient) {
///     // get(), delete() and subscribe() come for free
///     let _ = client.get("user_1".to_string()).await;
///     let _ = client.delete("user_1".to_string()).await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Delete an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }

    /// Follow an entity's state changes.
    #[tracing::instrument(skip(self))]
    async fn subscribe(&self, id: T::Id) -> Result<Subscription<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().subscribe(id).await.map_err(Self::map_error)
    }
}
