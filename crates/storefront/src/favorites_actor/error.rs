//! Error types for the Favorites actor.

use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FavoritesError {
    #[error("No open favorites for {0}")]
    NotOpen(String),

    /// The remote collection rejected a read or write. Membership is unchanged.
    #[error("Favorites store error: {0}")]
    Store(#[from] StoreError),

    #[error("Favorite entry could not be encoded: {0}")]
    Encoding(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for FavoritesError {
    fn from(msg: String) -> Self {
        FavoritesError::ActorCommunicationError(msg)
    }
}
