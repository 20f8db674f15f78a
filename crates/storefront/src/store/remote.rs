//! Remote per-user document collections (`cart`, `favorites`).
//!
//! The storefront consumes the remote database only through [`CollectionStore`]: upsert and
//! delete single documents, and watch full snapshots of a collection. Every collection carries
//! a revision that grows with each write, so a consumer can tell a late snapshot from a fresh one.

use crate::model::UserId;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tokio::sync::watch;
use tracing::warn;

/// Monotonic per-collection write counter. `0` is the empty, never-written collection.
pub type Revision = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionName {
    Cart,
    Favorites,
}

impl Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionName::Cart => f.write_str("cart"),
            CollectionName::Favorites => f.write_str("favorites"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: serde_json::Value,
}

/// The full contents of one collection at one revision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSnapshot {
    pub revision: Revision,
    pub documents: Vec<Document>,
}

impl CollectionSnapshot {
    /// Decodes every document body as `T`, paired with its document id.
    ///
    /// Documents that don't decode are skipped with a warning rather than failing the
    /// whole snapshot.
    pub fn decode<T: DeserializeOwned>(&self) -> Vec<(String, T)> {
        self.documents
            .iter()
            .filter_map(|doc| match serde_json::from_value(doc.fields.clone()) {
                Ok(value) => Some((doc.id.clone(), value)),
                Err(e) => {
                    warn!(doc_id = %doc.id, error = %e, "Skipping undecodable document");
                    None
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StoreError {
    #[error("Write rejected for {collection}/{doc_id}: {reason}")]
    WriteRejected {
        collection: CollectionName,
        doc_id: String,
        reason: String,
    },
    #[error("Remote store unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value collections scoped to a user, with change subscription.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Current contents of a collection.
    async fn snapshot(
        &self,
        user: &UserId,
        collection: CollectionName,
    ) -> Result<CollectionSnapshot, StoreError>;

    /// Live feed of full snapshots, starting with the current one.
    async fn subscribe(
        &self,
        user: &UserId,
        collection: CollectionName,
    ) -> Result<CollectionWatch, StoreError>;

    /// Creates or replaces a document. Returns the collection's new revision.
    async fn upsert(
        &self,
        user: &UserId,
        collection: CollectionName,
        doc_id: &str,
        fields: serde_json::Value,
    ) -> Result<Revision, StoreError>;

    /// Deletes a document; deleting a missing one succeeds. Returns the new revision.
    async fn delete(
        &self,
        user: &UserId,
        collection: CollectionName,
        doc_id: &str,
    ) -> Result<Revision, StoreError>;
}

/// Subscription handle on one collection. Dropping it unsubscribes.
///
/// Backed by a `watch` channel, so a slow reader sees the newest snapshot rather than a
/// backlog of intermediate ones.
pub struct CollectionWatch {
    receiver: watch::Receiver<CollectionSnapshot>,
}

impl CollectionWatch {
    pub fn new(receiver: watch::Receiver<CollectionSnapshot>) -> Self {
        Self { receiver }
    }

    /// The latest snapshot, marking it as seen.
    pub fn current(&mut self) -> CollectionSnapshot {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for a snapshot newer than the last one seen. `None` once the store goes away.
    pub async fn changed(&mut self) -> Option<CollectionSnapshot> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}
