//! Admin sales figures. All money stays in `Decimal`; only the completion
//! rate, a percentage, is a float.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::{round_cents, Order, OrderStatus};

pub const DEFAULT_TOP_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantSales {
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub order_count: usize,
    pub revenue: Decimal,
}

pub fn total_revenue(orders: &[Order]) -> Decimal {
    orders.iter().map(|order| order.total).sum()
}

pub fn active_count(orders: &[Order]) -> usize {
    orders.iter().filter(|order| order.status != OrderStatus::Delivered).count()
}

pub fn completed_count(orders: &[Order]) -> usize {
    orders.iter().filter(|order| order.status == OrderStatus::Delivered).count()
}

/// Revenue per order, rounded to cents. Zero without orders.
pub fn average_order_value(orders: &[Order]) -> Decimal {
    if orders.is_empty() {
        return Decimal::ZERO;
    }
    round_cents(total_revenue(orders) / Decimal::from(orders.len()))
}

/// Percentage of delivered orders. Zero without orders.
pub fn completion_rate(orders: &[Order]) -> f64 {
    if orders.is_empty() {
        return 0.0;
    }
    completed_count(orders) as f64 / orders.len() as f64 * 100.0
}

/// Best sellers by quantity, priced at the frozen order prices.
///
/// Ties keep the order in which items were first seen.
pub fn top_items(orders: &[Order], n: usize) -> Vec<TopItem> {
    let mut items: Vec<TopItem> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for line in orders.iter().flat_map(|order| &order.items) {
        let slot = *index.entry(line.menu_item_id.as_str()).or_insert_with(|| {
            items.push(TopItem {
                menu_item_id: line.menu_item_id.clone(),
                name: line.name.clone(),
                quantity: 0,
                revenue: Decimal::ZERO,
            });
            items.len() - 1
        });
        items[slot].quantity += u64::from(line.quantity);
        items[slot].revenue += line.line_total();
    }

    items.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    items.truncate(n);
    items
}

/// Order count and revenue per restaurant, highest revenue first.
pub fn per_restaurant_breakdown(orders: &[Order]) -> Vec<RestaurantSales> {
    let mut rows: Vec<RestaurantSales> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for order in orders {
        let slot = *index.entry(order.restaurant_id.as_str()).or_insert_with(|| {
            rows.push(RestaurantSales {
                restaurant_id: order.restaurant_id.clone(),
                restaurant_name: order.restaurant_name.clone(),
                order_count: 0,
                revenue: Decimal::ZERO,
            });
            rows.len() - 1
        });
        rows[slot].order_count += 1;
        rows[slot].revenue += order.total;
    }

    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    rows
}

/// Everything the admin dashboard shows, computed in one pass over a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub total_orders: usize,
    pub total_revenue: Decimal,
    pub active_orders: usize,
    pub completed_orders: usize,
    pub average_order_value: Decimal,
    pub completion_rate: f64,
    pub top_items: Vec<TopItem>,
    pub restaurants: Vec<RestaurantSales>,
}

impl SalesReport {
    pub fn from_orders(orders: &[Order], top_n: usize) -> Self {
        Self {
            total_orders: orders.len(),
            total_revenue: total_revenue(orders),
            active_orders: active_count(orders),
            completed_orders: completed_count(orders),
            average_order_value: average_order_value(orders),
            completion_rate: completion_rate(orders),
            top_items: top_items(orders, top_n),
            restaurants: per_restaurant_breakdown(orders),
        }
    }
}
