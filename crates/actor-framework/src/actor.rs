//! # Generic Actor Server
//!
//! The `ResourceActor` owns every live instance of one entity type and processes requests for
//! them one at a time. That sequential mailbox is the only serialization point aggregates need:
//! two rapid "add to cart" clicks become two queued messages, never two interleaved writes.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Change, ResourceRequest};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

/// Lower bound for the change feed capacity, independent of the mailbox size.
const MIN_CHANGE_FEED_CAPACITY: usize = 16;

/// The generic actor that manages a collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the state (`store`), the receiver
/// end of the request channel and the sending end of the change feed.
///
/// **Concurrency Model**:
/// Each actor processes its own messages *sequentially* in a loop, so the `store` needs no
/// `Mutex` or `RwLock`. Different actors (cart, favorites, …) still run in parallel.
///
/// # Usage Pattern
///
/// 1.  **Create**: Call `ResourceActor::new()` to get the `actor` (server) and `client`.
/// 2.  **Wire**: Pass dependencies (stores, other clients) into `actor.run(context)`.
/// 3.  **Run**: Spawn the run loop in a background task.
///
/// ```rust
/// use actor_framework::{ActorEntity, ResourceActor};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Counter { hits: u32 }
/// #[derive(Debug)] struct CounterCreate;
/// #[derive(Debug)] struct CounterUpdate;
/// #[derive(Debug)] enum CounterAction { Hit }
/// #[derive(Debug, thiserror::Error)] #[error("counter error")] struct CounterError;
///
/// #[async_trait]
/// impl ActorEntity for Counter {
///     type Id = String;
///     type Create = CounterCreate;
///     type Update = CounterUpdate;
///     type Action = CounterAction;
///     type ActionResult = u32;
///     type Context = ();
///     type Error = CounterError;
///
///     fn from_create_params(_: String, _: CounterCreate) -> Result<Self, Self::Error> {
///         Ok(Self { hits: 0 })
///     }
///     async fn on_update(&mut self, _: CounterUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
///     async fn handle_action(&mut self, _: CounterAction, _: &()) -> Result<u32, Self::Error> {
///         self.hits += 1;
///         Ok(self.hits)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Counter>::new(10);
///     tokio::spawn(actor.run(()));
///
///     client.create("home".to_string(), CounterCreate).await.unwrap();
///     let hits = client.perform_action("home".to_string(), CounterAction::Hit).await.unwrap();
///     assert_eq!(hits, 1);
/// }
/// ```
///
/// # Operations
///
/// * **Create**: rejects a duplicate id, builds the entity with `from_create_params`, runs
///   `on_create`, stores it and publishes `Change::Upserted`.
/// * **Get**: returns a clone of the entity, or `None`.
/// * **Update**: runs `on_update` in place and publishes the new state.
/// * **Delete**: runs `on_delete`, removes the entity and publishes `Change::Removed`.
/// * **Action**: runs `handle_action`; on success publishes the new state.
/// * **Subscribe**: hands out the current state and a change feed receiver in one step.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    changes: broadcast::Sender<Change<T>>,
    store: HashMap<T::Id, T>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new `ResourceActor` and its associated `ResourceClient`.
    ///
    /// `buffer_size` is the mailbox capacity; when it is full, client calls wait.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (changes, _) = broadcast::channel(buffer_size.max(MIN_CHANGE_FEED_CAPACITY));
        let actor = Self {
            receiver,
            changes,
            store: HashMap::new(),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    fn publish(&self, change: Change<T>) {
        // No subscribers is the common case and not an error.
        let _ = self.changes.send(change);
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    ///
    /// # Context Injection
    /// The `context` argument is handed to every entity hook, so entities can reach stores
    /// and other clients that were created after the actor itself.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "Cart" instead of "xcart::model::cart::Cart")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create {
                    id,
                    params,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?params, "Create");
                    if self.store.contains_key(&id) {
                        warn!(entity_type, %id, "Already exists");
                        let _ = respond_to.send(Err(FrameworkError::AlreadyExists(id.to_string())));
                        continue;
                    }

                    match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create(&context).await {
                                warn!(entity_type, %id, error = %e, "on_create failed");
                                let _ =
                                    respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                                continue;
                            }
                            self.store.insert(id.clone(), item.clone());
                            info!(entity_type, %id, size = self.store.len(), "Created");
                            self.publish(Change::Upserted {
                                id: id.clone(),
                                item,
                            });
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(entity_type, %id, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_update(update, &context).await {
                        warn!(entity_type, %id, error = %e, "Update failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    let snapshot = item.clone();
                    info!(entity_type, %id, "Updated");
                    self.publish(Change::Upserted {
                        id,
                        item: snapshot.clone(),
                    });
                    let _ = respond_to.send(Ok(snapshot));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let Some(item) = self.store.get(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    if let Err(e) = item.on_delete(&context).await {
                        warn!(entity_type, %id, error = %e, "on_delete failed");
                        let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        continue;
                    }
                    self.store.remove(&id);
                    info!(entity_type, %id, size = self.store.len(), "Deleted");
                    self.publish(Change::Removed { id });
                    let _ = respond_to.send(Ok(()));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let Some(item) = self.store.get_mut(&id) else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                        continue;
                    };
                    let result = item
                        .handle_action(action, &context)
                        .await
                        .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                    match &result {
                        Ok(_) => {
                            debug!(entity_type, %id, "Action ok");
                            let snapshot = item.clone();
                            self.publish(Change::Upserted { id, item: snapshot });
                        }
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Subscribe { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let subscribers = self.changes.receiver_count() + 1;
                    debug!(entity_type, %id, subscribers, "Subscribe");
                    let _ = respond_to.send(Ok((item, self.changes.subscribe())));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }
}
