use tokio::sync::mpsc;
use tracing::{debug, instrument};
use crate::cart_actor::CartError;
use crate::domain::{CartItem, CartSummary};
use crate::messages::CartRequest;

/// Client for the CartService with macro-generated methods. Thin wrapper
/// around the message channel.
#[derive(Clone)]
pub struct CartClient {
    sender: mpsc::Sender<CartRequest>,
}

impl CartClient {
    pub fn new(sender: mpsc::Sender<CartRequest>) -> Self {
        Self { sender }
    }

    /// No response needed
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), CartError> {
        debug!("Sending shutdown request");
        self.sender
            .send(CartRequest::Shutdown)
            .await
            .map_err(|e| CartError::ActorCommunicationError(e.to_string()))
    }
}

client_method!(CartClient => fn add_item(menu_item_id: String) -> u32 as CartRequest::AddItem, Error = CartError);
client_method!(CartClient => fn set_quantity(menu_item_id: String, quantity: i64) -> () as CartRequest::SetQuantity, Error = CartError);
client_method!(CartClient => fn remove_item(menu_item_id: String) -> () as CartRequest::RemoveItem, Error = CartError);
client_method!(CartClient => fn clear() -> () as CartRequest::Clear, Error = CartError);
client_method!(CartClient => fn items() -> Vec<CartItem> as CartRequest::Items, Error = CartError);
client_method!(CartClient => fn summary() -> CartSummary as CartRequest::Summary, Error = CartError);
client_method!(CartClient => fn item_count() -> u32 as CartRequest::ItemCount, Error = CartError);
