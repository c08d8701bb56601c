use thiserror::Error;

use super::config::ConfigError;
use crate::cart_actor::CartError;
use crate::domain::CatalogError;
use crate::order_actor::OrderError;
use crate::review_actor::ReviewError;
use crate::storage::StoreError;

/// Failures of engine startup, session changes and shutdown.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SystemError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error("Actor task failed: {0}")]
    ActorTaskFailed(String),
}
