use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{round_cents, Order, OrderCreate, OrderStatus};

/// `ORD-` followed by twelve upper-case hex digits of a random UUID.
pub fn next_order_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", hex[..12].to_uppercase())
}

fn non_blank(value: &str, field: &'static str) -> Result<String, OrderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(OrderError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    fn id(&self) -> &String { &self.id }

    /// Freezes a priced cart snapshot into a new order.
    ///
    /// # Notes
    /// The order starts in `Preparing`; `total = subtotal + delivery_fee`.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let address = non_blank(&params.details.address, "address")?;
        let phone = non_blank(&params.details.phone, "phone")?;

        let subtotal: Decimal = params.items.iter().map(|line| line.line_total()).sum();
        Ok(Self {
            id,
            user_id: params.user_id,
            restaurant_id: params.restaurant_id,
            restaurant_name: params.restaurant_name,
            items: params.items,
            subtotal,
            delivery_fee: params.delivery_fee,
            total: subtotal + params.delivery_fee,
            status: OrderStatus::Preparing,
            created_at: Utc::now(),
            address,
            phone,
            notes: optional_text(params.details.notes),
            rating: None,
            review: None,
            simulation: None,
        })
    }

    fn on_create(&mut self) -> Result<(), OrderError> {
        info!(order_id = %self.id, total = %self.total, "Order placed");
        Ok(())
    }

    /// A stored order must still satisfy what creation guaranteed: at least
    /// one line, no zero quantities, consistent totals and a valid rating.
    fn check_restored(&self) -> Result<(), OrderError> {
        let inconsistent = |reason| OrderError::Inconsistent { id: self.id.clone(), reason };
        if self.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        if self.items.iter().any(|line| line.quantity == 0) {
            return Err(inconsistent("line with zero quantity"));
        }
        let lines: Decimal = self.items.iter().map(|line| line.line_total()).sum();
        if round_cents(lines) != round_cents(self.subtotal) {
            return Err(inconsistent("subtotal does not match its lines"));
        }
        if round_cents(self.subtotal + self.delivery_fee) != round_cents(self.total) {
            return Err(inconsistent("total is not subtotal plus delivery fee"));
        }
        match self.rating {
            Some(rating) if !(1..=5).contains(&rating) => Err(OrderError::InvalidRating(rating)),
            _ => Ok(()),
        }
    }

    /// Handles order-specific actions.
    ///
    /// # Actions
    /// - `Advance`: next status in sequence, no-op when delivered
    /// - `SetStatus`: forward jump or same-status no-op
    /// - `BeginSimulation` / `SimulatedAdvance` / `EndSimulation`: timer-driven progression
    /// - `AttachRating`: one rating per delivered order, by its owner
    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        let from = self.status;
        match action {
            OrderAction::Advance => {
                self.simulation = None;
                self.step_forward();
                Ok(self.transition(from))
            }
            OrderAction::SetStatus(target) => {
                if target < from {
                    return Err(OrderError::InvalidStatus(format!(
                        "order {} cannot move back from {} to {}",
                        self.id, from, target
                    )));
                }
                self.simulation = None;
                self.status = target;
                Ok(self.transition(from))
            }
            OrderAction::BeginSimulation(ticket) => {
                if from.is_terminal() {
                    return Ok(OrderActionResult::Simulation(false));
                }
                self.simulation = Some(ticket);
                Ok(OrderActionResult::Simulation(true))
            }
            OrderAction::SimulatedAdvance(ticket) => {
                if self.simulation != Some(ticket) {
                    debug!(order_id = %self.id, ticket, "Ignoring stale simulated step");
                    return Ok(self.transition(from));
                }
                self.step_forward();
                if self.status.is_terminal() {
                    self.simulation = None;
                }
                Ok(self.transition(from))
            }
            OrderAction::EndSimulation(ticket) => {
                if self.simulation == Some(ticket) {
                    self.simulation = None;
                }
                Ok(self.transition(from))
            }
            OrderAction::AttachRating { user_id, rating, review } => {
                if user_id != self.user_id {
                    return Err(OrderError::NotOwner(self.id.clone()));
                }
                if !(1..=5).contains(&rating) {
                    return Err(OrderError::InvalidRating(rating));
                }
                if self.is_rated() {
                    return Err(OrderError::AlreadyRated(self.id.clone()));
                }
                if !from.is_terminal() {
                    return Err(OrderError::NotDelivered(self.id.clone()));
                }
                self.rating = Some(rating);
                self.review = optional_text(review);
                Ok(OrderActionResult::Rated { rating })
            }
        }
    }
}

impl Order {
    fn step_forward(&mut self) {
        if let Some(next) = self.status.next() {
            self.status = next;
        }
    }

    fn transition(&self, from: OrderStatus) -> OrderActionResult {
        if from != self.status {
            info!(order_id = %self.id, from = %from, to = %self.status, "Order status changed");
        }
        OrderActionResult::Transition { from, to: self.status }
    }
}
