//! Session cart: the line items a customer has picked but not yet ordered.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
