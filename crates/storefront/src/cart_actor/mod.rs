//! Cart aggregate: entity implementation, actions and errors.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::CartClient;
use crate::model::Cart;
use actor_framework::ResourceActor;

/// Creates a new Cart actor and its client.
///
/// The actor must be run with the remote collection store as its context.
pub fn new(buffer_size: usize) -> (ResourceActor<Cart>, CartClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    let client = CartClient::new(generic_client);

    (actor, client)
}
