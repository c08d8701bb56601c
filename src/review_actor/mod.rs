pub mod entity;
pub mod error;

pub use entity::{next_review_id, ReviewAction};
pub use error::*;
