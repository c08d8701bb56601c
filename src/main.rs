use std::time::Duration;

use foodhub_engine::domain::{Catalog, CheckoutDetails, OrderStatus, User};
use foodhub_engine::{setup_tracing, EngineConfig, FoodHub, MemoryStore};
use tracing::{error, info, Instrument};

const DEMO_CATALOG: &str = r#"{
  "restaurants": [
    {"id": "1", "name": "Pizza Palace", "description": "Wood-fired pizza", "image": "",
     "deliveryTime": "25-35 min", "minimumOrder": 15, "categories": ["Pizza", "Drinks"]},
    {"id": "2", "name": "Burger Haven", "description": "Smash burgers", "image": "",
     "deliveryTime": "20-30 min", "minimumOrder": 10, "categories": ["Burgers"]}
  ],
  "menuItems": [
    {"id": "p1", "restaurantId": "1", "name": "Margherita", "description": "Tomato, mozzarella, basil",
     "price": 10, "image": "", "category": "Pizza"},
    {"id": "p2", "restaurantId": "1", "name": "Cola", "description": "Ice cold", "price": 5,
     "image": "", "category": "Drinks"},
    {"id": "b1", "restaurantId": "2", "name": "Classic Burger", "description": "Double patty",
     "price": 8.5, "image": "", "category": "Burgers"}
  ]
}"#;

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let mut config = EngineConfig::from_env().map_err(|e| e.to_string())?;
    config.progression = foodhub_engine::progression::ProgressionDelays::uniform(Duration::from_millis(200));
    let catalog = Catalog::from_json(DEMO_CATALOG).map_err(|e| e.to_string())?;

    info!("Starting FoodHub demo");
    let hub = FoodHub::start(config, catalog, MemoryStore::shared()).map_err(|e| e.to_string())?;

    let customer = User::customer("c1", "Demo Customer", "customer@demo.com");
    hub.sign_in(customer).await.map_err(|e| e.to_string())?;

    let span = tracing::info_span!("checkout");
    let filled = async {
        hub.add_to_cart("p1").await?;
        hub.add_to_cart("p1").await?;
        hub.add_to_cart("p2").await?;
        let summary = hub.cart_summary().await?;
        info!(subtotal = %summary.subtotal, total = %summary.total, "Cart ready");
        Ok::<_, foodhub_engine::CartError>(())
    }
    .instrument(span)
    .await;
    if let Err(e) = filled {
        error!(error = %e, "Could not fill the cart");
        return Err(e.to_string());
    }

    let order = hub
        .submit_order(CheckoutDetails::new("12 Harbour Road", "555-0100"))
        .await
        .map_err(|e| e.to_string())?;
    info!(order_id = %order.id, total = %order.total, "Order submitted");

    hub.simulate_progression(&order.id).await.map_err(|e| e.to_string())?;
    tokio::time::sleep(Duration::from_millis(500)).await;

    let tracked = hub.get_order(&order.id).await.map_err(|e| e.to_string())?;
    info!(status = %tracked.status, "Tracking");
    if tracked.status == OrderStatus::Delivered {
        hub.attach_order_rating(&order.id, 5, Some("Still hot".to_string()))
            .await
            .map_err(|e| e.to_string())?;
    }
    hub.submit_menu_item_review("p1", 5, Some("Perfect crust".to_string()))
        .await
        .map_err(|e| e.to_string())?;
    let rating = hub.menu_item_rating("p1").await.map_err(|e| e.to_string())?;
    info!(rating = %rating.label(), reviews = rating.count, "Margherita rating");

    hub.sign_in(User::admin("a1", "Restaurant Admin", "admin@demo.com"))
        .await
        .map_err(|e| e.to_string())?;
    let report = hub.sales_report().await.map_err(|e| e.to_string())?;
    info!(
        revenue = %report.total_revenue,
        orders = report.total_orders,
        completion_rate = report.completion_rate,
        "Sales report"
    );

    hub.sign_out().await.map_err(|e| e.to_string())?;
    hub.shutdown().await.map_err(|e| e.to_string())?;

    info!("Demo completed successfully");
    Ok(())
}
