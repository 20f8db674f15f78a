//! Address book aggregate, persisted in the local snapshot store under `<user>/userAddresses`.
//!
//! Not mirrored remotely and not fed by any subscription: the stored snapshot is only re-read
//! when the book is opened or explicitly reloaded.

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::AddressClient;
use crate::model::AddressBook;
use actor_framework::ResourceActor;

/// Creates a new AddressBook actor and its client.
pub fn new(buffer_size: usize) -> (ResourceActor<AddressBook>, AddressClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size);
    let client = AddressClient::new(generic_client);

    (actor, client)
}
