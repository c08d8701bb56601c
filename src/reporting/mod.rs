//! Read-only views derived on demand from the order and review collections.

pub mod ratings;
pub mod sales;

pub use ratings::*;
pub use sales::*;
