//! # Subscriptions
//!
//! A [`Subscription`] is a cancellable handle on one entity's change feed. It replaces
//! callback-style listeners: the consumer pulls changes with `recv().await` and stops
//! listening by calling [`Subscription::unsubscribe`] or simply dropping the handle.

use crate::entity::ActorEntity;
use crate::message::Change;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::debug;

/// Live view of a single entity, obtained from `ResourceClient::subscribe`.
///
/// The first `recv` returns the state captured at subscribe time (when the entity existed).
/// A subscriber that falls behind the feed does not replay the backlog: it jumps to the most
/// recent change for its id, which is always a complete state.
pub struct Subscription<T: ActorEntity> {
    id: T::Id,
    pending: Option<Change<T>>,
    receiver: Option<broadcast::Receiver<Change<T>>>,
}

impl<T: ActorEntity> Subscription<T> {
    pub(crate) fn new(
        id: T::Id,
        current: Option<T>,
        receiver: broadcast::Receiver<Change<T>>,
    ) -> Self {
        let pending = current.map(|item| Change::Upserted {
            id: id.clone(),
            item,
        });
        Self {
            id,
            pending,
            receiver: Some(receiver),
        }
    }

    /// The entity id this subscription follows.
    pub fn id(&self) -> &T::Id {
        &self.id
    }

    /// Waits for the next change to this entity.
    ///
    /// Returns `None` once unsubscribed or when the actor has shut down.
    pub async fn recv(&mut self) -> Option<Change<T>> {
        if let Some(change) = self.pending.take() {
            return Some(change);
        }

        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Ok(change) if change.id() == &self.id => return Some(change),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(id = %self.id, skipped, "Subscriber lagged, skipping to latest");
                    if let Some(latest) = self.drain_latest() {
                        return Some(latest);
                    }
                }
                Err(RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Consumes everything currently buffered and keeps only the newest change for our id.
    fn drain_latest(&mut self) -> Option<Change<T>> {
        let receiver = self.receiver.as_mut()?;
        let mut latest = None;
        loop {
            match receiver.try_recv() {
                Ok(change) if change.id() == &self.id => latest = Some(change),
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) => return latest,
                Err(TryRecvError::Closed) => {
                    self.receiver = None;
                    return latest;
                }
            }
        }
    }

    /// Stops listening. Later calls to `recv` return `None`.
    pub fn unsubscribe(&mut self) {
        self.pending = None;
        self.receiver = None;
    }

    pub fn is_active(&self) -> bool {
        self.receiver.is_some()
    }
}
