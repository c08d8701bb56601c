//! Typed handles for talking to the actors.

#[macro_use]
mod macros;

pub mod cart_client;
pub mod order_client;
pub mod review_client;

pub use cart_client::*;
pub use order_client::*;
pub use review_client::*;
