//! Read-only restaurant and menu reference data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Category name that matches every menu item in a restaurant.
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    /// Free-text estimate such as "30-40 min".
    pub delivery_time: String,
    pub minimum_order: Decimal,
    pub categories: Vec<String>,
}

impl Restaurant {
    /// Tab labels for the menu view: `"all"` followed by the restaurant's categories.
    pub fn category_tabs(&self) -> Vec<&str> {
        std::iter::once(ALL_CATEGORIES)
            .chain(self.categories.iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: String,
    pub category: String,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Duplicate restaurant id: {0}")]
    DuplicateRestaurant(String),
    #[error("Duplicate menu item id: {0}")]
    DuplicateMenuItem(String),
    #[error("Menu item {item} references unknown restaurant {restaurant}")]
    UnknownRestaurant { item: String, restaurant: String },
    #[error("Menu item {item} has category {category} not offered by its restaurant")]
    UnknownCategory { item: String, category: String },
    #[error("Menu item {item} has a negative price")]
    NegativePrice { item: String },
    #[error("Catalog parse error: {0}")]
    Parse(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    restaurants: Vec<Restaurant>,
    menu_items: Vec<MenuItem>,
}

/// Immutable lookup table of restaurants and menu items, keyed by id.
///
/// Source order is kept for listings; lookups go through the id indexes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
    menu_items: Vec<MenuItem>,
    restaurant_index: HashMap<String, usize>,
    menu_index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, checking ids, restaurant references, categories and prices.
    pub fn new(restaurants: Vec<Restaurant>, menu_items: Vec<MenuItem>) -> Result<Self, CatalogError> {
        let mut restaurant_index = HashMap::with_capacity(restaurants.len());
        for (pos, restaurant) in restaurants.iter().enumerate() {
            if restaurant_index.insert(restaurant.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateRestaurant(restaurant.id.clone()));
            }
        }

        let mut menu_index = HashMap::with_capacity(menu_items.len());
        for (pos, item) in menu_items.iter().enumerate() {
            let Some(&owner) = restaurant_index.get(&item.restaurant_id) else {
                return Err(CatalogError::UnknownRestaurant {
                    item: item.id.clone(),
                    restaurant: item.restaurant_id.clone(),
                });
            };
            if !restaurants[owner].categories.contains(&item.category) {
                return Err(CatalogError::UnknownCategory {
                    item: item.id.clone(),
                    category: item.category.clone(),
                });
            }
            if item.price < Decimal::ZERO {
                return Err(CatalogError::NegativePrice { item: item.id.clone() });
            }
            if menu_index.insert(item.id.clone(), pos).is_some() {
                return Err(CatalogError::DuplicateMenuItem(item.id.clone()));
            }
        }

        Ok(Self {
            restaurants,
            menu_items,
            restaurant_index,
            menu_index,
        })
    }

    /// Parses `{ "restaurants": [...], "menuItems": [...] }`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::new(doc.restaurants, doc.menu_items)
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn restaurant(&self, id: &str) -> Option<&Restaurant> {
        self.restaurant_index.get(id).map(|&pos| &self.restaurants[pos])
    }

    pub fn menu_item(&self, id: &str) -> Option<&MenuItem> {
        self.menu_index.get(id).map(|&pos| &self.menu_items[pos])
    }

    pub fn menu_for<'a, 'b>(&'a self, restaurant_id: &'b str) -> impl Iterator<Item = &'a MenuItem> + 'b
    where
        'a: 'b,
    {
        self.menu_items
            .iter()
            .filter(move |item| item.restaurant_id == restaurant_id)
    }

    /// Menu view filter: category (`None` or `"all"` for every category) and a
    /// case-insensitive search over name and description.
    pub fn search_menu(&self, restaurant_id: &str, category: Option<&str>, query: &str) -> Vec<&MenuItem> {
        let needle = query.trim().to_lowercase();
        let category = category.filter(|c| *c != ALL_CATEGORIES);

        self.menu_for(restaurant_id)
            .filter(|item| category.map_or(true, |c| item.category == c))
            .filter(|item| {
                needle.is_empty()
                    || item.name.to_lowercase().contains(&needle)
                    || item.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        let catalog = catalog();
        assert_eq!(catalog.restaurant("2").unwrap().name, "Burger Haven");
        assert_eq!(catalog.menu_item("C").unwrap().price, Decimal::new(1299, 2));
        assert!(catalog.menu_item("missing").is_none());
    }

    #[test]
    fn test_rejects_category_outside_restaurant() {
        let err = Catalog::new(
            vec![restaurant("1", "Pizza Palace", &["Pizza"])],
            vec![menu_item("A", "1", "Sushi", Decimal::ONE, "Rolls")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownCategory { item: "A".into(), category: "Rolls".into() }
        );
    }

    #[test]
    fn test_rejects_dangling_restaurant_reference() {
        let err = Catalog::new(vec![], vec![menu_item("A", "9", "Ghost", Decimal::ONE, "Pizza")]).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownRestaurant { .. }));
    }

    #[test]
    fn test_search_menu_filters_category_and_text() {
        let catalog = catalog();
        let pizzas: Vec<_> = catalog.search_menu("1", Some("Pizza"), "").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(pizzas, vec!["A", "C"]);

        let hits: Vec<_> = catalog.search_menu("1", Some("all"), "PEPP").iter().map(|i| i.id.as_str()).collect();
        assert_eq!(hits, vec!["C"]);

        assert_eq!(catalog.search_menu("1", None, "tasty cola").len(), 1);
    }

    #[test]
    fn test_search_results_outlive_the_restaurant_id() {
        let catalog = catalog();
        let items = {
            let restaurant_id = String::from("1");
            catalog.search_menu(&restaurant_id, None, "")
        };
        assert_eq!(items.len(), catalog.menu_for("1").count());
        assert!(items.iter().all(|item| item.restaurant_id == "1"));
    }

    #[test]
    fn test_from_json_uses_camel_case() {
        let json = r#"{
            "restaurants": [{"id":"1","name":"Sushi Station","description":"","image":"",
                "deliveryTime":"35-45 min","minimumOrder":20,"categories":["Rolls"]}],
            "menuItems": [{"id":"s1","restaurantId":"1","name":"Dragon Roll","description":"",
                "price":13.5,"image":"","category":"Rolls"}]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.menu_item("s1").unwrap().price, Decimal::new(135, 1));
        assert_eq!(catalog.restaurant("1").unwrap().category_tabs(), vec!["all", "Rolls"]);
    }
}
