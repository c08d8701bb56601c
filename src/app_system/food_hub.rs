use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::config::EngineConfig;
use super::error::SystemError;
use crate::actor_framework::ResourceActor;
use crate::cart_actor::{CartError, CartService};
use crate::clients::{CartClient, OrderClient, ReviewClient};
use crate::domain::{
    CartItem, CartSummary, Catalog, CheckoutDetails, Order, OrderCreate, OrderLine, OrderStatus, Review,
    ReviewCreate, StatusBoard, User,
};
use crate::order_actor::{next_order_id, OrderError};
use crate::progression::ProgressionScheduler;
use crate::reporting::{aggregate, RatingSummary, RatingTarget, SalesReport};
use crate::review_actor::{next_review_id, ReviewError};
use crate::session::Session;
use crate::storage::{load_slot, persist_committed, SharedStore, CART_SLOT, ORDERS_SLOT, REVIEWS_SLOT, USER_SLOT};

/// The engine: starts the cart, order and review actors, holds the session,
/// and exposes every command and query the presentation layer calls.
///
/// Must be started from within a tokio runtime.
pub struct FoodHub {
    config: EngineConfig,
    catalog: Arc<Catalog>,
    store: SharedStore,
    session: Session,
    cart: CartClient,
    orders: OrderClient,
    reviews: ReviewClient,
    progression: ProgressionScheduler,
    handles: Vec<JoinHandle<()>>,
}

impl FoodHub {
    /// Loads every slot from `store` and spawns the actors.
    ///
    /// # Errors
    /// `SystemError::Storage` when a slot cannot be read or decoded,
    /// `SystemError::Config` when the configuration is invalid.
    pub fn start(config: EngineConfig, catalog: Catalog, store: SharedStore) -> Result<Self, SystemError> {
        config.validate()?;
        let catalog = Arc::new(catalog);

        let cart_items: Vec<CartItem> = load_slot(store.as_ref(), CART_SLOT)?.unwrap_or_default();
        let orders: Vec<Order> = load_slot(store.as_ref(), ORDERS_SLOT)?.unwrap_or_default();
        let reviews: Vec<Review> = load_slot(store.as_ref(), REVIEWS_SLOT)?.unwrap_or_default();
        let user: Option<User> = load_slot(store.as_ref(), USER_SLOT)?;
        info!(
            cart_entries = cart_items.len(),
            orders = orders.len(),
            reviews = reviews.len(),
            signed_in = user.is_some(),
            "State restored"
        );

        // 1. Cart service
        let (cart_service, cart) = CartService::new(config.channel_capacity, catalog.clone(), config.delivery_fee);
        let cart_service = cart_service.restore(cart_items).persist_to(store.clone());
        let cart_handle = tokio::spawn(cart_service.run());

        // 2. Orders
        let (order_actor, order_resource_client) = ResourceActor::<Order>::new(config.channel_capacity, next_order_id);
        let order_actor = order_actor.restore(orders).persist_to(store.clone(), ORDERS_SLOT);
        let orders = OrderClient::new(order_resource_client);
        let order_handle = tokio::spawn(order_actor.run());

        // 3. Reviews
        let (review_actor, review_resource_client) = ResourceActor::<Review>::new(config.channel_capacity, next_review_id);
        let review_actor = review_actor.restore(reviews).persist_to(store.clone(), REVIEWS_SLOT);
        let reviews = ReviewClient::new(review_resource_client);
        let review_handle = tokio::spawn(review_actor.run());

        let progression = ProgressionScheduler::new(orders.clone(), config.progression);

        Ok(Self {
            config,
            catalog,
            store,
            session: Session::new(user),
            cart,
            orders,
            reviews,
            progression,
            handles: vec![cart_handle, order_handle, review_handle],
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ---------------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------------

    pub fn current_user(&self) -> Option<User> {
        self.session.current()
    }

    /// Makes `user` the active session user. Switching to a different user
    /// empties the cart left behind by the previous one.
    #[instrument(skip(self, user), fields(user_id = %user.id, role = %user.role))]
    pub async fn sign_in(&self, user: User) -> Result<(), SystemError> {
        persist_committed(self.store.as_ref(), USER_SLOT, &user);
        let user_id = user.id.clone();
        if let Some(previous) = self.session.replace(Some(user)) {
            if previous.id != user_id {
                self.cart.clear().await?;
            }
        }
        info!("Signed in");
        Ok(())
    }

    /// Ends the session: cancels pending progressions, empties the cart and
    /// forgets the user. Orders and reviews are kept.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), SystemError> {
        self.progression.cancel_all();
        self.cart.clear().await?;
        if let Some(user) = self.session.replace(None) {
            info!(user_id = %user.id, "Signed out");
        }
        if let Err(e) = self.store.remove(USER_SLOT) {
            error!(error = %e, "Failed to remove session user from storage");
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Cart
    // ---------------------------------------------------------------------

    /// Adds one unit of a menu item; returns its new quantity.
    pub async fn add_to_cart(&self, menu_item_id: &str) -> Result<u32, CartError> {
        self.session.require_customer()?;
        self.cart.add_item(menu_item_id.to_string()).await
    }

    /// Sets the quantity of an entry. `0` removes it; negative quantities fail.
    pub async fn update_cart_quantity(&self, menu_item_id: &str, quantity: i64) -> Result<(), CartError> {
        self.session.require_customer()?;
        self.cart.set_quantity(menu_item_id.to_string(), quantity).await
    }

    pub async fn remove_from_cart(&self, menu_item_id: &str) -> Result<(), CartError> {
        self.session.require_customer()?;
        self.cart.remove_item(menu_item_id.to_string()).await
    }

    pub async fn clear_cart(&self) -> Result<(), CartError> {
        self.session.require_customer()?;
        self.cart.clear().await
    }

    pub async fn cart_items(&self) -> Result<Vec<CartItem>, CartError> {
        self.session.require_customer()?;
        self.cart.items().await
    }

    /// Units in the cart, for the cart badge.
    pub async fn cart_item_count(&self) -> Result<u32, CartError> {
        self.session.require_customer()?;
        self.cart.item_count().await
    }

    pub async fn cart_summary(&self) -> Result<CartSummary, CartError> {
        self.session.require_customer()?;
        self.cart.summary().await
    }

    // ---------------------------------------------------------------------
    // Orders
    // ---------------------------------------------------------------------

    /// Turns the cart into an order at the current catalog prices, then
    /// empties the cart.
    ///
    /// # Errors
    /// `EmptyCart` leaves everything untouched; so does a blank address or phone.
    #[instrument(skip(self, details))]
    pub async fn submit_order(&self, details: CheckoutDetails) -> Result<Order, OrderError> {
        let user = self.session.require_customer()?;
        let summary = self.cart.summary().await?;
        let Some(restaurant_id) = summary.restaurant_id.clone().filter(|_| !summary.is_empty()) else {
            warn!("Checkout attempted with an empty cart");
            return Err(OrderError::EmptyCart);
        };
        let restaurant = self
            .catalog
            .restaurant(&restaurant_id)
            .ok_or_else(|| OrderError::UnknownRestaurant(restaurant_id.clone()))?;

        let items = summary
            .lines
            .into_iter()
            .map(|line| OrderLine {
                menu_item_id: line.menu_item_id,
                name: line.name,
                unit_price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();

        let order = self
            .orders
            .create_order(OrderCreate {
                user_id: user.id,
                restaurant_id,
                restaurant_name: restaurant.name.clone(),
                items,
                delivery_fee: self.config.delivery_fee,
                details,
            })
            .await?;

        if let Err(e) = self.cart.clear().await {
            error!(order_id = %order.id, error = %e, "Order placed but the cart could not be cleared");
        }
        Ok(order)
    }

    /// An order the current user may see: their own, or any for an admin.
    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        let user = self.session.require_user()?;
        let order = self.orders.require_order(order_id.to_string()).await?;
        if !user.is_admin() && order.user_id != user.id {
            return Err(OrderError::NotOwner(order.id));
        }
        Ok(order)
    }

    /// Moves an order one step forward. Open to admins and to the customer
    /// who placed it; a pending simulated progression is cancelled.
    #[instrument(skip(self))]
    pub async fn advance_order_status(&self, order_id: &str) -> Result<OrderStatus, OrderError> {
        self.get_order(order_id).await?;
        let status = self.orders.advance(order_id.to_string()).await?;
        self.progression.cancel(order_id);
        Ok(status)
    }

    /// Admin override. Forward jumps and repeats are allowed, backward moves are not.
    #[instrument(skip(self))]
    pub async fn set_order_status(&self, order_id: &str, status: OrderStatus) -> Result<OrderStatus, OrderError> {
        self.session.require_admin()?;
        let status = self.orders.set_status(order_id.to_string(), status).await?;
        self.progression.cancel(order_id);
        Ok(status)
    }

    /// Starts the timed `Preparing -> OnTheWay -> Delivered` walk for an
    /// order. Returns `false` when it is already delivered.
    #[instrument(skip(self))]
    pub async fn simulate_progression(&self, order_id: &str) -> Result<bool, OrderError> {
        self.get_order(order_id).await?;
        self.progression.schedule(order_id.to_string()).await
    }

    pub fn cancel_progression(&self, order_id: &str) -> bool {
        self.progression.cancel(order_id)
    }

    pub async fn attach_order_rating(
        &self,
        order_id: &str,
        rating: u8,
        review: Option<String>,
    ) -> Result<(), OrderError> {
        let user = self.session.require_customer()?;
        self.orders
            .attach_rating(order_id.to_string(), user.id, rating, review)
            .await?;
        Ok(())
    }

    /// The current customer's orders, newest first.
    pub async fn list_user_orders(&self) -> Result<Vec<Order>, OrderError> {
        let user = self.session.require_customer()?;
        let mut orders = self.orders.list_orders().await?;
        orders.retain(|order| order.user_id == user.id);
        Ok(newest_first(orders))
    }

    pub async fn list_all_orders(&self) -> Result<Vec<Order>, OrderError> {
        self.session.require_admin()?;
        Ok(newest_first(self.orders.list_orders().await?))
    }

    /// Admin board: active orders by state plus the latest deliveries.
    pub async fn orders_by_status(&self) -> Result<StatusBoard, OrderError> {
        let orders = self.list_all_orders().await?;
        let mut board = StatusBoard::default();
        for order in orders {
            match order.status {
                OrderStatus::Preparing => board.preparing.push(order),
                OrderStatus::OnTheWay => board.on_the_way.push(order),
                OrderStatus::Delivered => board.recently_delivered.push(order),
            }
        }
        board.recently_delivered.truncate(self.config.recent_delivered_limit);
        Ok(board)
    }

    pub async fn sales_report(&self) -> Result<SalesReport, OrderError> {
        self.session.require_admin()?;
        let orders = self.orders.list_orders().await?;
        Ok(SalesReport::from_orders(&orders, self.config.top_items_limit))
    }

    // ---------------------------------------------------------------------
    // Reviews and ratings
    // ---------------------------------------------------------------------

    #[instrument(skip(self, comment))]
    pub async fn submit_menu_item_review(
        &self,
        menu_item_id: &str,
        rating: u8,
        comment: Option<String>,
    ) -> Result<Review, ReviewError> {
        let user = self.session.require_customer()?;
        let item = self
            .catalog
            .menu_item(menu_item_id)
            .ok_or_else(|| ReviewError::UnknownMenuItem(menu_item_id.to_string()))?;

        self.reviews
            .create_review(ReviewCreate {
                user_id: user.id,
                user_name: user.name,
                menu_item_id: item.id.clone(),
                restaurant_id: item.restaurant_id.clone(),
                rating,
                comment,
            })
            .await
    }

    /// Reviews of one menu item, newest first.
    pub async fn menu_item_reviews(&self, menu_item_id: &str) -> Result<Vec<Review>, ReviewError> {
        let mut reviews = self.reviews.list_reviews().await?;
        reviews.retain(|review| review.menu_item_id == menu_item_id);
        reviews.reverse();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }

    pub async fn menu_item_rating(&self, menu_item_id: &str) -> Result<RatingSummary, ReviewError> {
        let reviews = self.reviews.list_reviews().await?;
        Ok(aggregate(&reviews, RatingTarget::MenuItem(menu_item_id)))
    }

    pub async fn restaurant_rating(&self, restaurant_id: &str) -> Result<RatingSummary, ReviewError> {
        let reviews = self.reviews.list_reviews().await?;
        Ok(aggregate(&reviews, RatingTarget::Restaurant(restaurant_id)))
    }

    // ---------------------------------------------------------------------
    // Shutdown
    // ---------------------------------------------------------------------

    /// Cancels pending progressions, closes every actor and waits for them.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down FoodHub...");
        let Self { cart, orders, reviews, progression, handles, .. } = self;

        progression.cancel_all();
        drop(progression);
        cart.shutdown().await?;
        drop(orders);
        drop(reviews);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTaskFailed(e.to_string()));
            }
        }

        info!("FoodHub shutdown complete.");
        Ok(())
    }
}

/// Newest first; equal timestamps keep the later insertion first.
fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.reverse();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::fixtures::catalog;
    use crate::messages::CartRequest;
    use crate::storage::MemoryStore;
    use rust_decimal::Decimal;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_order_is_returned_when_cart_clear_fails() {
        let mut hub = FoodHub::start(EngineConfig::default(), catalog(), MemoryStore::shared()).unwrap();
        hub.sign_in(User::customer("c1", "Demo Customer", "customer@demo.com")).await.unwrap();
        hub.add_to_cart("A").await.unwrap();
        let summary = hub.cart_summary().await.unwrap();

        // Answers the summary, drops every other request unanswered.
        let (sender, mut receiver) = mpsc::channel(4);
        hub.cart = CartClient::new(sender);
        tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                if let CartRequest::Summary { respond_to } = request {
                    let _ = respond_to.send(Ok(summary.clone()));
                }
            }
        });

        let order = hub.submit_order(CheckoutDetails::new("12 Harbour Road", "555-0100")).await.unwrap();
        assert_eq!(order.total, Decimal::new(1299, 2));
        assert_eq!(hub.list_user_orders().await.unwrap().len(), 1);
    }
}
