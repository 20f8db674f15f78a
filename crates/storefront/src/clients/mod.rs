//! Type-safe wrappers around [`ResourceClient`](actor_framework::ResourceClient), one per
//! aggregate.

pub mod address_client;
pub mod cart_client;
pub mod favorites_client;
pub mod order_client;

pub use address_client::*;
pub use cart_client::*;
pub use favorites_client::*;
pub use order_client::*;
