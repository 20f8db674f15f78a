//! Storage seams: the remote per-user collections and the local snapshot store, with
//! in-memory and file implementations.

pub mod memory;
pub mod remote;
pub mod snapshot;

pub use memory::MemoryCollectionStore;
pub use remote::{
    CollectionName, CollectionSnapshot, CollectionStore, CollectionWatch, Document, Revision,
    StoreError,
};
pub use snapshot::{
    load_json, quarantine, save_json, FileSnapshotStore, MemorySnapshotStore, SnapshotError,
    SnapshotKey, SnapshotStore,
};
