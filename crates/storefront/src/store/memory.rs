use crate::model::UserId;
use crate::store::remote::{
    CollectionName, CollectionSnapshot, CollectionStore, CollectionWatch, Document, Revision,
    StoreError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

struct Collection {
    revision: Revision,
    documents: Vec<Document>,
    feed: watch::Sender<CollectionSnapshot>,
}

impl Collection {
    fn new() -> Self {
        let (feed, _) = watch::channel(CollectionSnapshot::default());
        Self {
            revision: 0,
            documents: Vec::new(),
            feed,
        }
    }

    fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            revision: self.revision,
            documents: self.documents.clone(),
        }
    }

    fn publish(&mut self) -> Revision {
        self.revision += 1;
        self.feed.send_replace(self.snapshot());
        self.revision
    }
}

type Key = (UserId, CollectionName);

/// In-process `CollectionStore`, used by the demo binary and tests.
///
/// `reject_writes(true)` makes every upsert/delete fail, to exercise write-failure paths.
#[derive(Default)]
pub struct MemoryCollectionStore {
    collections: Mutex<HashMap<Key, Collection>>,
    reject_writes: AtomicBool,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Key, Collection>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self, collection: CollectionName, doc_id: &str) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::WriteRejected {
                collection,
                doc_id: doc_id.to_string(),
                reason: "permission denied".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CollectionStore for MemoryCollectionStore {
    async fn snapshot(
        &self,
        user: &UserId,
        collection: CollectionName,
    ) -> Result<CollectionSnapshot, StoreError> {
        Ok(self
            .lock()
            .get(&(user.clone(), collection))
            .map(Collection::snapshot)
            .unwrap_or_default())
    }

    async fn subscribe(
        &self,
        user: &UserId,
        collection: CollectionName,
    ) -> Result<CollectionWatch, StoreError> {
        let mut collections = self.lock();
        let entry = collections
            .entry((user.clone(), collection))
            .or_insert_with(Collection::new);
        Ok(CollectionWatch::new(entry.feed.subscribe()))
    }

    async fn upsert(
        &self,
        user: &UserId,
        collection: CollectionName,
        doc_id: &str,
        fields: serde_json::Value,
    ) -> Result<Revision, StoreError> {
        self.check_writable(collection, doc_id)?;
        let mut collections = self.lock();
        let entry = collections
            .entry((user.clone(), collection))
            .or_insert_with(Collection::new);

        let document = Document {
            id: doc_id.to_string(),
            fields,
        };
        match entry.documents.iter_mut().find(|d| d.id == doc_id) {
            Some(existing) => *existing = document,
            None => entry.documents.push(document),
        }
        let revision = entry.publish();
        debug!(%user, %collection, doc_id, revision, "Upserted document");
        Ok(revision)
    }

    async fn delete(
        &self,
        user: &UserId,
        collection: CollectionName,
        doc_id: &str,
    ) -> Result<Revision, StoreError> {
        self.check_writable(collection, doc_id)?;
        let mut collections = self.lock();
        let Some(entry) = collections.get_mut(&(user.clone(), collection)) else {
            return Ok(0);
        };

        let before = entry.documents.len();
        entry.documents.retain(|d| d.id != doc_id);
        if entry.documents.len() == before {
            return Ok(entry.revision);
        }
        let revision = entry.publish();
        debug!(%user, %collection, doc_id, revision, "Deleted document");
        Ok(revision)
    }
}
