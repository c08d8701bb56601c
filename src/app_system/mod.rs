//! System orchestration, startup, and shutdown logic.

pub mod config;
pub mod error;
pub mod food_hub;
pub mod logging;

pub use config::*;
pub use error::*;
pub use food_hub::*;
pub use logging::*;
