//! # System Lifecycle & Session
//!
//! [`StorefrontSystem`] is the one place that wires the storefront together:
//!
//! 1. **Actor creation**: one actor per aggregate type (cart, favorites, address book, order
//!    ledger), created before anything is wired.
//! 2. **Context injection**: the cart and favorites actors run with the remote collection
//!    store, the address and order actors with the local snapshot store.
//! 3. **Session**: `sign_in` opens the four per-shopper aggregates and the long-lived remote
//!    subscriptions that feed the cart and favorites. `sign_out` cancels those subscriptions
//!    and closes the aggregates, so nothing is kept for a signed-out visitor.
//! 4. **Graceful shutdown**: drop every client and await the actor tasks.
//!
//! ```rust,ignore
//! let system = StorefrontSystem::new(config, remote, local, gateway);
//! system.sign_in(Identity::new("user_1")).await?;
//! system.add_to_cart(product).await?;
//! let ticket = system.place_order(AddressSelection::Default).await?;
//! system.shutdown().await;
//! ```
//!
//! The facade methods in [`session`] mirror what a shopper can do and report every outcome
//! as a [`Notice`](crate::notify::Notice) as well as a `Result`.

pub mod session;
pub mod storefront_system;

pub use storefront_system::*;
