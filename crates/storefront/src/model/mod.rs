//! Domain data types. The `ActorEntity` impls for the aggregates live next to their actors.

pub mod address;
pub mod cart;
pub mod favorites;
pub mod identity;
pub mod money;
pub mod order;
pub mod product;

pub use address::*;
pub use cart::*;
pub use favorites::*;
pub use identity::*;
pub use money::*;
pub use order::*;
pub use product::*;
