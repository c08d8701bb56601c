use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cart entry. Prices are not stored here; they are read from the
/// catalog until checkout freezes them into the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: String,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(menu_item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            quantity,
        }
    }
}

/// A cart entry priced against the live catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Everything the cart drawer and checkout view display.
#[derive(Debug, Clone, PartialEq)]
pub struct CartSummary {
    pub restaurant_id: Option<String>,
    pub lines: Vec<CartLine>,
    pub item_count: u32,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
    /// The subtotal is under the restaurant's minimum order. Informational only.
    pub below_minimum: bool,
}

impl CartSummary {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
