//! # Observability & Tracing
//!
//! Structured logging setup shared by every binary built on the framework.
//!
//! The actor runtime already emits one event per request, tagged with `entity_type` and the
//! entity id. [`setup_tracing`] installs a compact `tracing-subscriber` formatter whose level
//! comes from `RUST_LOG`, and hides module paths (`with_target(false)`) since `entity_type`
//! already says where an event came from.
//!
//! ```bash
//! # Lifecycle only: Actor started, Created, Deleted, Shutdown
//! RUST_LOG=info cargo run
//!
//! # Every request with its payload, e.g. `Action id=user_1 action=Add(Product { .. })`
//! RUST_LOG=debug cargo run
//!
//! # Only the storefront domain at debug level
//! RUST_LOG=xcart=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a checkout reads roughly as:
//!
//! ```text
//! INFO Created entity_type="Cart" id=user_1 size=1
//! INFO Action ok entity_type="OrderLedger" id=user_1
//! INFO Payment succeeded order_id="order_1718000000000_k3j9x0a1b"
//! ```

/// Installs the global subscriber. Calling it twice is harmless; the second call is ignored.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
