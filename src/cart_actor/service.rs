use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::error::CartError;
use crate::clients::CartClient;
use crate::domain::{line_total, CartItem, CartLine, CartSummary, Catalog};
use crate::messages::{CartRequest, ServiceResponse};
use crate::storage::{persist_committed, SharedStore, CART_SLOT};

/// Macro for clean error response handling
macro_rules! send_error {
    ($respond_to:expr, $error:expr) => {{
        let _ = $respond_to.send(Err($error));
        return;
    }};
}

/// Cart actor. Owns the cart of the active session; at most one entry per
/// menu item, all entries from the same restaurant.
pub struct CartService {
    receiver: mpsc::Receiver<CartRequest>,
    catalog: Arc<Catalog>,
    delivery_fee: Decimal,
    items: Vec<CartItem>,
    store: Option<SharedStore>,
}

impl CartService {
    pub fn new(buffer_size: usize, catalog: Arc<Catalog>, delivery_fee: Decimal) -> (Self, CartClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            catalog,
            delivery_fee,
            items: Vec::new(),
            store: None,
        };
        let client = CartClient::new(sender);
        (service, client)
    }

    /// Seeds the cart from a persisted snapshot. Entries that no longer fit the
    /// catalog or the cart invariants are dropped.
    pub fn restore(mut self, items: Vec<CartItem>) -> Self {
        for item in items {
            if item.quantity == 0 {
                warn!(menu_item_id = %item.menu_item_id, "Dropping restored cart entry with zero quantity");
                continue;
            }
            let Some(menu_item) = self.catalog.menu_item(&item.menu_item_id) else {
                warn!(menu_item_id = %item.menu_item_id, "Dropping restored cart entry for unknown menu item");
                continue;
            };
            if let Some(cart_restaurant) = self.restaurant_id() {
                if cart_restaurant != menu_item.restaurant_id {
                    warn!(menu_item_id = %item.menu_item_id, "Dropping restored cart entry from another restaurant");
                    continue;
                }
            }
            if self.item_count().checked_add(item.quantity).is_none() {
                warn!(menu_item_id = %item.menu_item_id, quantity = item.quantity, "Dropping restored cart entry that overflows the cart");
                continue;
            }
            match self.items.iter_mut().find(|e| e.menu_item_id == item.menu_item_id) {
                Some(existing) => existing.quantity += item.quantity,
                None => self.items.push(item),
            }
        }
        self
    }

    pub fn persist_to(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Main actor loop
    #[instrument(name = "cart_service", skip(self))]
    pub async fn run(mut self) {
        info!("CartService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                CartRequest::AddItem { menu_item_id, respond_to } => {
                    self.handle_add_item(menu_item_id, respond_to);
                }
                CartRequest::SetQuantity { menu_item_id, quantity, respond_to } => {
                    self.handle_set_quantity(menu_item_id, quantity, respond_to);
                }
                CartRequest::RemoveItem { menu_item_id, respond_to } => {
                    self.handle_remove_item(menu_item_id, respond_to);
                }
                CartRequest::Clear { respond_to } => {
                    self.handle_clear(respond_to);
                }
                CartRequest::Items { respond_to } => {
                    let _ = respond_to.send(Ok(self.items.clone()));
                }
                CartRequest::Summary { respond_to } => {
                    let _ = respond_to.send(Ok(self.summary()));
                }
                CartRequest::ItemCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.item_count()));
                }
                CartRequest::Shutdown => {
                    info!("CartService shutting down");
                    break;
                }
            }
        }

        info!("CartService stopped");
    }

    #[instrument(fields(menu_item_id = %menu_item_id), skip(self, respond_to))]
    fn handle_add_item(&mut self, menu_item_id: String, respond_to: ServiceResponse<u32, CartError>) {
        debug!("Processing add_item request");

        let Some(menu_item) = self.catalog.menu_item(&menu_item_id) else {
            warn!("Menu item not in catalog");
            send_error!(respond_to, CartError::UnknownMenuItem(menu_item_id));
        };
        if let Some(cart_restaurant) = self.restaurant_id() {
            if cart_restaurant != menu_item.restaurant_id {
                warn!(cart_restaurant = %cart_restaurant, "Rejected item from another restaurant");
                send_error!(respond_to, CartError::RestaurantMismatch {
                    cart: cart_restaurant.to_string(),
                    item: menu_item.restaurant_id.clone(),
                });
            }
        }

        if self.item_count().checked_add(1).is_none() {
            let current = self.quantity_of(&menu_item_id);
            warn!(current, "Cart is full");
            send_error!(respond_to, CartError::InvalidQuantity(i64::from(current) + 1));
        }

        let quantity = match self.items.iter_mut().find(|e| e.menu_item_id == menu_item_id) {
            Some(entry) => {
                entry.quantity += 1;
                entry.quantity
            }
            None => {
                self.items.push(CartItem::new(menu_item_id, 1));
                1
            }
        };

        info!(quantity, "Item added to cart");
        self.persist();
        let _ = respond_to.send(Ok(quantity));
    }

    #[instrument(fields(menu_item_id = %menu_item_id), skip(self, respond_to))]
    fn handle_set_quantity(&mut self, menu_item_id: String, quantity: i64, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing set_quantity request");

        if quantity == 0 {
            self.handle_remove_item(menu_item_id, respond_to);
            return;
        }
        let others = self.item_count() - self.quantity_of(&menu_item_id);
        let Some(quantity) = u32::try_from(quantity).ok().filter(|q| others.checked_add(*q).is_some()) else {
            warn!("Rejected quantity");
            send_error!(respond_to, CartError::InvalidQuantity(quantity));
        };

        match self.items.iter_mut().find(|e| e.menu_item_id == menu_item_id) {
            Some(entry) if entry.quantity != quantity => {
                entry.quantity = quantity;
                info!("Cart quantity updated");
                self.persist();
            }
            Some(_) => debug!("Quantity unchanged"),
            None => debug!("Item not in cart; nothing to update"),
        }
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(fields(menu_item_id = %menu_item_id), skip(self, respond_to))]
    fn handle_remove_item(&mut self, menu_item_id: String, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing remove_item request");

        let before = self.items.len();
        self.items.retain(|e| e.menu_item_id != menu_item_id);
        if self.items.len() != before {
            info!("Item removed from cart");
            self.persist();
        }
        let _ = respond_to.send(Ok(()));
    }

    #[instrument(skip(self, respond_to))]
    fn handle_clear(&mut self, respond_to: ServiceResponse<(), CartError>) {
        debug!("Processing clear request");

        if !self.items.is_empty() {
            self.items.clear();
            info!("Cart cleared");
            self.persist();
        }
        let _ = respond_to.send(Ok(()));
    }

    fn restaurant_id(&self) -> Option<&str> {
        self.items
            .first()
            .and_then(|e| self.catalog.menu_item(&e.menu_item_id))
            .map(|item| item.restaurant_id.as_str())
    }

    /// Total units in the cart. Every mutation keeps this within `u32`.
    fn item_count(&self) -> u32 {
        self.items.iter().fold(0u32, |total, e| total.saturating_add(e.quantity))
    }

    fn quantity_of(&self, menu_item_id: &str) -> u32 {
        self.items
            .iter()
            .find(|e| e.menu_item_id == menu_item_id)
            .map_or(0, |e| e.quantity)
    }

    /// Prices every entry against the current catalog.
    fn summary(&self) -> CartSummary {
        let lines: Vec<CartLine> = self
            .items
            .iter()
            .filter_map(|entry| {
                let item = self.catalog.menu_item(&entry.menu_item_id)?;
                Some(CartLine {
                    menu_item_id: item.id.clone(),
                    name: item.name.clone(),
                    unit_price: item.price,
                    quantity: entry.quantity,
                    line_total: line_total(item.price, entry.quantity),
                })
            })
            .collect();

        let subtotal: Decimal = lines.iter().map(|line| line.line_total).sum();
        let restaurant_id = self.restaurant_id().map(str::to_string);
        let below_minimum = restaurant_id
            .as_deref()
            .and_then(|id| self.catalog.restaurant(id))
            .is_some_and(|r| subtotal < r.minimum_order);
        // No fee on an empty cart; there is nothing to deliver.
        let delivery_fee = if lines.is_empty() { Decimal::ZERO } else { self.delivery_fee };

        CartSummary {
            restaurant_id,
            item_count: self.item_count(),
            subtotal,
            delivery_fee,
            total: subtotal + delivery_fee,
            below_minimum,
            lines,
        }
    }

    fn persist(&self) {
        if let Some(store) = &self.store {
            persist_committed(store.as_ref(), CART_SLOT, &self.items);
        }
    }
}
