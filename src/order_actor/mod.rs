//! Order lifecycle: creation from a cart snapshot, status transitions and ratings.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::next_order_id;
pub use error::*;
