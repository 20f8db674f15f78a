//! # ActorEntity Trait
//!
//! The `ActorEntity` trait is the contract every aggregate (cart, favorites, address book,
//! order ledger, …) implements to be hosted by the generic `ResourceActor`. It names the
//! identifier, the DTOs, the custom action vocabulary, the injected context and the error
//! type, and provides lifecycle hooks (`on_create`, `on_update`, `on_delete`, `handle_action`).
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_create`]
//! - [`ActorEntity::on_delete`]
//!
//! Both default to `Ok(())`. Override them when opening or closing an aggregate has side
//! effects, e.g. loading persisted state when a shopper signs in.

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// An aggregate hosted by [`ResourceActor`](crate::ResourceActor), one instance per id.
///
/// # Async & Context
/// This trait is `#[async_trait]` so hooks may await (e.g. writing through to a store).
/// The `Context` type is injected into every hook by `ResourceActor::run`, which lets
/// dependencies be bound late, after all actors and stores exist.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Key of one instance inside the actor.
    ///
    /// Ids are supplied by the caller on create. Per-identity aggregates are keyed by the
    /// signed-in user's id, so the actor never invents one.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Parameters of an open/create request.
    type Create: Send + Sync + Debug;

    /// Payload of an update, e.g. a fresh snapshot pushed by a store subscription.
    type Update: Send + Sync + Debug;

    /// The aggregate's own command vocabulary (`Add`, `Toggle`, `Append`, ...).
    type Action: Send + Sync + Debug;

    /// Reply to an `Action`, usually one variant per action.
    type ActionResult: Send + Sync + Debug;

    /// Dependencies handed to every hook, typically a store handle. `()` when there are none.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One enum per actor rather than one per message: every action of an aggregate
    /// returns the same error type, so clients match on a single enum.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds the in-memory instance. Runs before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Runs after construction and before the instance is stored; an error aborts the create.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Applies an update request.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Runs right before the instance is dropped from the actor.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Runs one custom action against the instance.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
