//! # Favorites Actor
//!
//! The favorites set of the signed-in shopper, mirrored from the remote `favorites`
//! collection. Membership is a set keyed by product id: `Add` of a member and `Remove` of a
//! non-member change nothing and write nothing, so rapid duplicate clicks converge.
//!
//! ```rust,ignore
//! let now_favorite = favorites.toggle(&owner, product.clone()).await?;
//! assert!(favorites.is_favorite(&owner, &product.id).await?);
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::FavoritesClient;
use crate::model::Favorites;
use actor_framework::ResourceActor;

/// Creates a new Favorites actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<Favorites>, FavoritesClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    let client = FavoritesClient::new(generic_client);

    (actor, client)
}
