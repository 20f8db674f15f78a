//! # Mock Framework & Testing Guide
//!
//! `MockClient<T>` hands out a real `ResourceClient<T>` whose requests are answered from a
//! queue of expectations instead of by an actor. Domain client wrappers can then be tested
//! for their mapping and orchestration logic without any entity state.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **State** | None, answers are scripted | Real state management |
//! | **Use Case** | Logic *around* the client | The entity itself, full flows |
//! | **Error Injection** | `return_err(..)` | Needs a store that fails |
//!
//! ## Testing Layers
//!
//! 0. **Client logic** against `MockClient` (this module).
//! 1. **Single actor** spawned with `ResourceActor::new` and a unit context.
//! 2. **Actor with test doubles** in its context, e.g. an in-memory store that can be told
//!    to reject writes.
//! 3. **Whole system** wired the way the binary wires it, driven end to end.
//!
//! ```rust
//! use actor_framework::mock::MockClient;
//! use actor_framework::{ActorEntity, FrameworkError};
//! use async_trait::async_trait;
//!
//! #[derive(Clone, Debug)] struct Basket { lines: u32 }
//! #[derive(Debug)] struct BasketCreate;
//! #[derive(Debug)] struct BasketUpdate;
//! #[derive(Debug)] enum BasketAction { Count }
//! #[derive(Debug, thiserror::Error)] #[error("basket error")] struct BasketError;
//!
//! #[async_trait]
//! impl ActorEntity for Basket {
//!     type Id = String; type Create = BasketCreate; type Update = BasketUpdate;
//!     type Action = BasketAction; type ActionResult = u32; type Context = (); type Error = BasketError;
//!     fn from_create_params(_: String, _: BasketCreate) -> Result<Self, Self::Error> { Ok(Self { lines: 0 }) }
//!     async fn on_update(&mut self, _: BasketUpdate, _: &()) -> Result<(), Self::Error> { Ok(()) }
//!     async fn handle_action(&mut self, _: BasketAction, _: &()) -> Result<u32, Self::Error> { Ok(self.lines) }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Basket>::new();
//!     mock.expect_action("user_1".to_string()).return_ok(3);
//!     mock.expect_get("user_1".to_string()).return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert_eq!(client.perform_action("user_1".to_string(), BasketAction::Count).await.unwrap(), 3);
//!     assert!(matches!(client.get("user_1".to_string()).await, Err(FrameworkError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! For assertions on the request payload itself, use [`create_mock_client`] and the
//! `expect_*` receiver helpers, which hand back the request and its reply channel.

use crate::client::ResourceClient;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{Change, ResourceRequest, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, mpsc};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// One scripted request and the reply it gets.
enum Expectation<T: ActorEntity> {
    Create {
        id: T::Id,
        response: Result<T::Id, FrameworkError>,
    },
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Update {
        id: T::Id,
        response: Result<T, FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Action {
        id: T::Id,
        response: Result<T::ActionResult, FrameworkError>,
    },
    Subscribe {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
}

type Queue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn lock<T: ActorEntity>(queue: &Queue<T>) -> MutexGuard<'_, VecDeque<Expectation<T>>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

fn check_id<I: PartialEq + std::fmt::Debug>(op: &str, expected: &I, actual: &I) {
    if expected != actual {
        panic!("{op}: expected id {expected:?}, got {actual:?}");
    }
}

fn reply<R>(respond_to: Response<R>, response: Result<R, FrameworkError>) {
    let _ = respond_to.send(response);
}

/// A mock client with expectation tracking for fluent testing.
///
/// Expectations are consumed in order. A request that doesn't match the next expectation
/// (wrong operation or wrong id) panics the mock task, which the caller observes as
/// `FrameworkError::ActorDropped`.
pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    expectations: Queue<T>,
    changes: broadcast::Sender<Change<T>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let (changes, _) = broadcast::channel(16);
        let expectations: Queue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();
        let feed = changes.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = lock(&queue).pop_front();

                match (request, expectation) {
                    (
                        ResourceRequest::Create { id, respond_to, .. },
                        Some(Expectation::Create { id: want, response }),
                    ) => {
                        check_id("create", &want, &id);
                        reply(respond_to, response);
                    }
                    (
                        ResourceRequest::Get { id, respond_to },
                        Some(Expectation::Get { id: want, response }),
                    ) => {
                        check_id("get", &want, &id);
                        reply(respond_to, response);
                    }
                    (
                        ResourceRequest::Update { id, respond_to, .. },
                        Some(Expectation::Update { id: want, response }),
                    ) => {
                        check_id("update", &want, &id);
                        reply(respond_to, response);
                    }
                    (
                        ResourceRequest::Delete { id, respond_to },
                        Some(Expectation::Delete { id: want, response }),
                    ) => {
                        check_id("delete", &want, &id);
                        reply(respond_to, response);
                    }
                    (
                        ResourceRequest::Action { id, respond_to, .. },
                        Some(Expectation::Action { id: want, response }),
                    ) => {
                        check_id("action", &want, &id);
                        reply(respond_to, response);
                    }
                    (
                        ResourceRequest::Subscribe { id, respond_to },
                        Some(Expectation::Subscribe { id: want, response }),
                    ) => {
                        check_id("subscribe", &want, &id);
                        reply(respond_to, response.map(|current| (current, feed.subscribe())));
                    }
                    (_, None) => panic!("Unexpected request: no expectations left"),
                    _ => panic!("Unexpected request or expectation mismatch"),
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            changes,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    fn builder<R>(
        &self,
        make: impl FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send + 'static,
    ) -> ExpectationBuilder<T, R> {
        ExpectationBuilder {
            expectations: self.expectations.clone(),
            make: Box::new(make),
        }
    }

    /// Expects a `create` for `id`.
    pub fn expect_create(&mut self, id: T::Id) -> ExpectationBuilder<T, T::Id> {
        self.builder(move |response| Expectation::Create { id, response })
    }

    /// Expects a `get` for `id`.
    pub fn expect_get(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Get { id, response })
    }

    /// Expects an `update` for `id`.
    pub fn expect_update(&mut self, id: T::Id) -> ExpectationBuilder<T, T> {
        self.builder(move |response| Expectation::Update { id, response })
    }

    /// Expects a `delete` for `id`.
    pub fn expect_delete(&mut self, id: T::Id) -> ExpectationBuilder<T, ()> {
        self.builder(move |response| Expectation::Delete { id, response })
    }

    /// Expects a `perform_action` for `id`.
    pub fn expect_action(&mut self, id: T::Id) -> ExpectationBuilder<T, T::ActionResult> {
        self.builder(move |response| Expectation::Action { id, response })
    }

    /// Expects a `subscribe` for `id`; `return_ok` sets the initial state handed out.
    pub fn expect_subscribe(&mut self, id: T::Id) -> ExpectationBuilder<T, Option<T>> {
        self.builder(move |response| Expectation::Subscribe { id, response })
    }

    /// Pushes a change to every subscription opened through this mock.
    pub fn emit(&self, change: Change<T>) {
        let _ = self.changes.send(change);
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

/// Builder returned by the `expect_*` methods; finish it with `return_ok` or `return_err`.
pub struct ExpectationBuilder<T: ActorEntity, R> {
    expectations: Queue<T>,
    make: Box<dyn FnOnce(Result<R, FrameworkError>) -> Expectation<T> + Send>,
}

impl<T: ActorEntity, R> ExpectationBuilder<T, R> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: R) {
        let expectation = (self.make)(Ok(value));
        lock(&self.expectations).push_back(expectation);
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        let expectation = (self.make)(Err(error));
        lock(&self.expectations).push_back(expectation);
    }
}

// =============================================================================
// RECEIVER HELPERS
// =============================================================================

/// Creates a client and the receiving end of its mailbox.
///
/// The test plays the actor: it pulls requests with the `expect_*` helpers below, asserts on
/// their payloads and answers through the returned reply channel.
pub fn create_mock_client<T: ActorEntity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Returns the next request if it is a Create.
pub async fn expect_create<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Create, Response<T::Id>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create {
            id,
            params,
            respond_to,
        }) => Some((id, params, respond_to)),
        _ => None,
    }
}

/// Returns the next request if it is a Get.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Returns the next request if it is an Action.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action {
            id,
            action,
            respond_to,
        }) => Some((id, action, respond_to)),
        _ => None,
    }
}
