//! # FoodHub engine
//!
//! The order and cart core of a food-delivery app, run as a set of tokio
//! actors behind one coordinator, [`FoodHub`]:
//!
//! - the session cart (`cart_actor`), one restaurant at a time;
//! - orders (`order_actor`) moving `Preparing -> OnTheWay -> Delivered`,
//!   by hand or through a timed simulation (`progression`);
//! - menu item reviews (`review_actor`);
//! - ratings and sales figures derived on demand (`reporting`).
//!
//! State is persisted as whole collections in the named slots of a
//! host-provided [`StateStore`].

pub mod actor_framework;
pub mod app_system;
pub mod cart_actor;
pub mod clients;
pub mod domain;
pub mod messages;
pub mod order_actor;
pub mod progression;
pub mod reporting;
pub mod review_actor;
pub mod session;
pub mod storage;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, try_setup_tracing, ConfigError, EngineConfig, FoodHub, SystemError};
pub use cart_actor::CartError;
pub use order_actor::OrderError;
pub use review_actor::ReviewError;
pub use session::AccessError;
pub use storage::{MemoryStore, SharedStore, StateStore, StoreError};
