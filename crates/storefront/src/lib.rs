//! # XCart Storefront
//!
//! The state core of a small storefront: a per-shopper cart, favorites, address book and
//! order ledger, plus the checkout that turns a cart into an order paid through an embedded
//! payment widget.
//!
//! - **[model]**: plain data types ([`Cart`](model::Cart), [`Order`](model::Order), …).
//! - **Aggregates**: one actor per type, each in its own module with entity, actions and
//!   errors ([`cart_actor`], [`favorites_actor`], [`address_actor`], [`order_actor`]).
//! - **[clients]**: typed wrappers that hide the message passing.
//! - **[store]**: the remote collection and local snapshot seams.
//! - **[payment]** and **[checkout]**: the widget seam and the orchestration on top of it.
//! - **[lifecycle]**: wiring, sign-in/sign-out and the shopper-facing facade.
//!
//! See [`actor_framework::mock`] for testing clients without running actors.

pub mod address_actor;
pub mod cart_actor;
pub mod checkout;
pub mod clients;
pub mod config;
pub mod error;
pub mod favorites_actor;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod order_actor;
pub mod payment;
pub mod store;
