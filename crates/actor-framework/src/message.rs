//! # Generic Messages
//!
//! The request envelope sent from a `ResourceClient` to its `ResourceActor`, and the change
//! notifications the actor publishes back out.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::{broadcast, oneshot};

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to the actor to request operations.
///
/// The variants map to the CRUD lifecycle of a resource plus a custom `Action` for
/// domain operations that don't fit CRUD (adding a product to a cart, toggling a favorite).
///
/// - **Create**: opens the resource under a caller-chosen id.
/// - **Get**: fetches the current state by id.
/// - **Update**: applies an [`ActorEntity::Update`] DTO.
/// - **Delete**: closes the resource.
/// - **Action**: executes an [`ActorEntity::Action`].
/// - **Subscribe**: returns the current state together with a change feed receiver that
///   starts right after it, so no change can fall between the two.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        id: T::Id,
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Subscribe {
        id: T::Id,
        respond_to: Response<(Option<T>, broadcast::Receiver<Change<T>>)>,
    },
}

/// A state change published by a `ResourceActor` after a successful mutation.
///
/// `Upserted` always carries the full entity, so a subscriber that missed intermediate
/// changes loses nothing by jumping to the latest one.
#[derive(Debug, Clone)]
pub enum Change<T: ActorEntity> {
    Upserted { id: T::Id, item: T },
    Removed { id: T::Id },
}

impl<T: ActorEntity> Change<T> {
    /// The id of the entity this change concerns.
    pub fn id(&self) -> &T::Id {
        match self {
            Change::Upserted { id, .. } | Change::Removed { id } => id,
        }
    }
}
