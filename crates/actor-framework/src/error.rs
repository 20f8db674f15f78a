//! # Framework Errors
//!
//! Errors raised by the runtime itself, as opposed to the per-entity errors an aggregate
//! returns from its hooks (those travel wrapped in [`FrameworkError::EntityError`]).

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Attempts to recover the entity's own error type from an `EntityError`.
    ///
    /// Domain clients use this to surface e.g. `CartError::Store` instead of a
    /// stringly-typed communication error.
    pub fn into_entity_error<E>(self) -> Result<E, Self>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            Self::EntityError(inner) => match inner.downcast::<E>() {
                Ok(e) => Ok(*e),
                Err(inner) => Err(Self::EntityError(inner)),
            },
            other => Err(other),
        }
    }
}
