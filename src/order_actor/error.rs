use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::cart_actor::CartError;
use crate::domain::UnknownStatus;
use crate::session::AccessError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error("Order {0} belongs to another user")]
    NotOwner(String),
    #[error("Invalid rating: {0} (expected 1 to 5)")]
    InvalidRating(u8),
    #[error("Order {0} has already been rated")]
    AlreadyRated(String),
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Order {0} has not been delivered yet")]
    NotDelivered(String),
    #[error("Missing checkout field: {0}")]
    MissingField(&'static str),
    #[error("Order {id} is inconsistent: {reason}")]
    Inconsistent { id: String, reason: &'static str },
    #[error("Restaurant not found: {0}")]
    UnknownRestaurant(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => OrderError::OrderNotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<CartError> for OrderError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::Access(access) => OrderError::Access(access),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<UnknownStatus> for OrderError {
    fn from(e: UnknownStatus) -> Self {
        OrderError::InvalidStatus(e.0)
    }
}
