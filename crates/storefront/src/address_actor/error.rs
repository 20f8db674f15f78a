//! Error types for the AddressBook actor.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AddressError {
    #[error("No open address book for {0}")]
    NotOpen(String),

    /// The local snapshot store failed. The book is unchanged.
    #[error("Address book persistence failed: {0}")]
    Persistence(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for AddressError {
    fn from(msg: String) -> Self {
        AddressError::ActorCommunicationError(msg)
    }
}
