use thiserror::Error;

use crate::session::AccessError;

/// Errors that can occur during cart operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CartError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
    #[error("Menu item not found: {0}")]
    UnknownMenuItem(String),
    #[error("Cart already holds items from restaurant {cart}, cannot add an item from restaurant {item}")]
    RestaurantMismatch { cart: String, item: String },
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
