use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::{line_total, DEFAULT_DELIVERY_FEE};

/// Delivery progress of an order. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Preparing,
    OnTheWay,
    Delivered,
}

impl OrderStatus {
    /// The following status, or `None` once delivered.
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Preparing => Some(OrderStatus::OnTheWay),
            OrderStatus::OnTheWay => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Delivered
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Preparing => "preparing",
            OrderStatus::OnTheWay => "on-the-way",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status name is not one of the three lifecycle states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown order status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "preparing" | "Preparing" => Ok(OrderStatus::Preparing),
            "on-the-way" | "on_the_way" | "OnTheWay" => Ok(OrderStatus::OnTheWay),
            "delivered" | "Delivered" => Ok(OrderStatus::Delivered),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A line item frozen at checkout. Later catalog edits never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        line_total(self.unit_price, self.quantity)
    }
}

/// Represents a submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub items: Vec<OrderLine>,
    pub subtotal: Decimal,
    #[serde(default = "default_delivery_fee")]
    pub delivery_fee: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub address: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    /// Ticket of the simulated progression currently allowed to move this order.
    #[serde(skip)]
    pub(crate) simulation: Option<u64>,
}

fn default_delivery_fee() -> Decimal {
    DEFAULT_DELIVERY_FEE
}

impl Order {
    pub fn is_rated(&self) -> bool {
        self.rating.is_some()
    }
}

/// Delivery details entered at checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutDetails {
    pub address: String,
    pub phone: String,
    pub notes: Option<String>,
}

impl CheckoutDetails {
    pub fn new(address: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            phone: phone.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Parameters for creating an order from a priced cart snapshot.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub items: Vec<OrderLine>,
    pub delivery_fee: Decimal,
    pub details: CheckoutDetails,
}

/// Admin board: orders split by lifecycle state.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    pub preparing: Vec<Order>,
    pub on_the_way: Vec<Order>,
    /// Most recent deliveries only.
    pub recently_delivered: Vec<Order>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_sequence() {
        assert_eq!(OrderStatus::Preparing.next(), Some(OrderStatus::OnTheWay));
        assert_eq!(OrderStatus::OnTheWay.next(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert!(OrderStatus::Preparing < OrderStatus::Delivered);
    }

    #[test]
    fn test_status_parse_and_serde_names() {
        assert_eq!("on-the-way".parse::<OrderStatus>(), Ok(OrderStatus::OnTheWay));
        assert_eq!("cancelled".parse::<OrderStatus>(), Err(UnknownStatus("cancelled".into())));
        assert_eq!(serde_json::to_string(&OrderStatus::OnTheWay).unwrap(), "\"on-the-way\"");
    }

    #[test]
    fn test_missing_delivery_fee_defaults() {
        let json = r#"{"id":"ORD-1","userId":"u","restaurantId":"1","restaurantName":"Pizza Palace",
            "items":[{"menuItemId":"A","name":"Margherita","unitPrice":10,"quantity":1}],
            "subtotal":10,"total":12.99,"status":"preparing","createdAt":"2024-05-01T12:00:00Z",
            "address":"1 Main St","phone":"555"}"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.delivery_fee, DEFAULT_DELIVERY_FEE);
        assert_eq!(order.notes, None);
        assert_eq!(order.simulation, None);
        assert!(!order.is_rated());
    }
}
