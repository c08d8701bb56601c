use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::session::AccessError;

/// Errors that can occur while recording menu item reviews.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReviewError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Invalid rating: {0} (expected 1 to 5)")]
    InvalidRating(u8),
    #[error("Menu item not found: {0}")]
    UnknownMenuItem(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for ReviewError {
    fn from(e: FrameworkError) -> Self {
        ReviewError::ActorCommunicationError(e.to_string())
    }
}
