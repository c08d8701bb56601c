use tokio::sync::oneshot;
use crate::cart_actor::CartError;
use crate::domain::{CartItem, CartSummary};

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Messages understood by the cart service. Each variant carries its
/// parameters and a oneshot channel for the response.
#[derive(Debug)]
pub enum CartRequest {
    AddItem {
        menu_item_id: String,
        respond_to: ServiceResponse<u32, CartError>,
    },
    SetQuantity {
        menu_item_id: String,
        quantity: i64,
        respond_to: ServiceResponse<(), CartError>,
    },
    RemoveItem {
        menu_item_id: String,
        respond_to: ServiceResponse<(), CartError>,
    },
    Clear {
        respond_to: ServiceResponse<(), CartError>,
    },
    Items {
        respond_to: ServiceResponse<Vec<CartItem>, CartError>,
    },
    Summary {
        respond_to: ServiceResponse<CartSummary, CartError>,
    },
    ItemCount {
        respond_to: ServiceResponse<u32, CartError>,
    },
    Shutdown,
}
