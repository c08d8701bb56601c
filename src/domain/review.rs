use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer's rating of a single menu item. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub menu_item_id: String,
    pub restaurant_id: String,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a review. Author and restaurant are resolved by
/// the caller from the session and the catalog.
#[derive(Debug, Clone)]
pub struct ReviewCreate {
    pub user_id: String,
    pub user_name: String,
    pub menu_item_id: String,
    pub restaurant_id: String,
    pub rating: u8,
    pub comment: Option<String>,
}
