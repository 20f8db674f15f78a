//! # Actor Framework
//!
//! Building blocks for type-safe, concurrent resource actors. Each resource type gets one
//! [`ResourceActor`] running in its own Tokio task; everything that wants to touch that
//! resource talks to it through a cheap, cloneable [`ResourceClient`].
//!
//! ## Resource Orientation + Actors
//!
//! - Every resource exposes the same verbs: Create, Get, Update, Delete, plus an `Action`
//!   enum for the operations that don't fit CRUD.
//! - State lives inside the actor and is only touched from its run loop, so a resource type
//!   needs no locks. Requests for it are applied strictly one after another.
//! - Different resource types run in parallel and coordinate by calling each other's clients.
//! - Every successful mutation is published as a [`Change`], which [`Subscription`]s follow.
//!
//! **Further Reading**:
//! - [Actors with Tokio](https://ryhl.io/blog/actors-with-tokio/) - the pattern this crate packages
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the domain state and its rules
//! 2. **Runtime Layer** ([`ResourceActor`]) - mailbox, storage, change feed
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - typed requests
//!
//! ```rust
//! use actor_framework::{ActorEntity, Change, ResourceActor};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)]
//! struct Shelf { owner: String, books: Vec<String> }
//!
//! #[derive(Debug)] struct ShelfCreate;
//! #[derive(Debug)] struct ShelfUpdate { books: Vec<String> }
//! #[derive(Debug)] enum ShelfAction { Add(String) }
//!
//! #[derive(Debug, thiserror::Error)]
//! enum ShelfError {
//!     #[error("duplicate book: {0}")]
//!     Duplicate(String),
//! }
//!
//! #[async_trait]
//! impl ActorEntity for Shelf {
//!     type Id = String;
//!     type Create = ShelfCreate;
//!     type Update = ShelfUpdate;
//!     type Action = ShelfAction;
//!     type ActionResult = usize;
//!     type Context = ();
//!     type Error = ShelfError;
//!
//!     fn from_create_params(owner: String, _: ShelfCreate) -> Result<Self, Self::Error> {
//!         Ok(Self { owner, books: Vec::new() })
//!     }
//!
//!     async fn on_update(&mut self, update: ShelfUpdate, _: &()) -> Result<(), Self::Error> {
//!         self.books = update.books;
//!         Ok(())
//!     }
//!
//!     async fn handle_action(&mut self, action: ShelfAction, _: &()) -> Result<usize, Self::Error> {
//!         let ShelfAction::Add(title) = action;
//!         if self.books.contains(&title) {
//!             return Err(ShelfError::Duplicate(title));
//!         }
//!         self.books.push(title);
//!         Ok(self.books.len())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = ResourceActor::<Shelf>::new(10);
//!     tokio::spawn(actor.run(()));
//!
//!     let id = client.create("ada".to_string(), ShelfCreate).await.unwrap();
//!     let mut feed = client.subscribe(id.clone()).await.unwrap();
//!
//!     client.perform_action(id.clone(), ShelfAction::Add("Dune".into())).await.unwrap();
//!
//!     // A second add of the same title comes back as the entity's own error.
//!     let err = client
//!         .perform_action(id.clone(), ShelfAction::Add("Dune".into()))
//!         .await
//!         .unwrap_err()
//!         .into_entity_error::<ShelfError>()
//!         .unwrap();
//!     assert!(matches!(err, ShelfError::Duplicate(_)));
//!
//!     // Initial state first, then the successful add. Failed actions publish nothing.
//!     assert!(matches!(feed.recv().await, Some(Change::Upserted { item, .. }) if item.books.is_empty()));
//!     assert!(matches!(feed.recv().await, Some(Change::Upserted { item, .. }) if item.books.len() == 1));
//! }
//! ```
//!
//! ## Context Injection
//!
//! Dependencies reach an entity through `ResourceActor::run(context)`, not through the
//! constructor. All actors and clients can be created first and wired afterwards, which
//! breaks construction cycles between resources that call each other. The storefront's cart
//! actor, for instance, runs with a handle to the remote collection store it writes through.
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real `ResourceClient` from scripted expectations, for
//! testing the code *around* a client without any actor. See the [`mock`] module.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod subscription;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use message::{Change, ResourceRequest, Response};
pub use subscription::Subscription;
