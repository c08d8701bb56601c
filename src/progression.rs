//! # Simulated delivery progression
//!
//! After checkout an order walks `Preparing -> OnTheWay -> Delivered` on a
//! timer. Each scheduled run carries a ticket registered on the order; a manual
//! transition revokes the ticket inside the order actor, so a timer step that
//! fires afterwards is a no-op. The task is also aborted when the run is
//! replaced or cancelled.

use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument, warn};

use crate::clients::OrderClient;
use crate::order_actor::OrderError;

/// Delays between the simulated status steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionDelays {
    #[serde(rename = "to_on_the_way_ms", with = "millis")]
    pub to_on_the_way: Duration,
    #[serde(rename = "to_delivered_ms", with = "millis")]
    pub to_delivered: Duration,
}

impl Default for ProgressionDelays {
    fn default() -> Self {
        Self {
            to_on_the_way: Duration::from_secs(5),
            to_delivered: Duration::from_secs(5),
        }
    }
}

impl ProgressionDelays {
    pub fn uniform(delay: Duration) -> Self {
        Self { to_on_the_way: delay, to_delivered: delay }
    }
}

mod millis {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

type Running = Arc<Mutex<HashMap<String, (u64, AbortHandle)>>>;

/// Owns the timer tasks of all simulated progressions.
pub struct ProgressionScheduler {
    orders: OrderClient,
    delays: ProgressionDelays,
    next_ticket: AtomicU64,
    running: Running,
}

impl ProgressionScheduler {
    pub fn new(orders: OrderClient, delays: ProgressionDelays) -> Self {
        Self {
            orders,
            delays,
            next_ticket: AtomicU64::new(1),
            running: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts a simulated progression for `order_id`, replacing any run
    /// already in flight for it.
    ///
    /// Returns `false` when the order is already delivered.
    #[instrument(skip(self))]
    pub async fn schedule(&self, order_id: String) -> Result<bool, OrderError> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst);
        if !self.orders.begin_simulation(order_id.clone(), ticket).await? {
            debug!("Order already delivered, nothing to simulate");
            return Ok(false);
        }

        let mut running = self.running.lock();
        let task = tokio::spawn(drive(
            self.orders.clone(),
            self.delays,
            order_id.clone(),
            ticket,
            self.running.clone(),
        ));
        if let Some((previous, handle)) = running.insert(order_id, (ticket, task.abort_handle())) {
            debug!(previous, "Replacing earlier progression");
            handle.abort();
        }
        info!(ticket, "Progression scheduled");
        Ok(true)
    }

    /// Stops the progression of one order. Returns whether one was running.
    pub fn cancel(&self, order_id: &str) -> bool {
        match self.running.lock().remove(order_id) {
            Some((ticket, handle)) => {
                handle.abort();
                debug!(order_id, ticket, "Progression cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let drained: Vec<_> = self.running.lock().drain().collect();
        if !drained.is_empty() {
            info!(count = drained.len(), "Cancelling all progressions");
        }
        for (_, (_, handle)) in drained {
            handle.abort();
        }
    }

    pub fn is_running(&self, order_id: &str) -> bool {
        self.running.lock().contains_key(order_id)
    }

    pub fn active_count(&self) -> usize {
        self.running.lock().len()
    }
}

impl Drop for ProgressionScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn drive(orders: OrderClient, delays: ProgressionDelays, order_id: String, ticket: u64, running: Running) {
    for delay in [delays.to_on_the_way, delays.to_delivered] {
        tokio::time::sleep(delay).await;
        match orders.simulated_advance(order_id.clone(), ticket).await {
            Ok(status) if status.is_terminal() => break,
            Ok(status) => debug!(order_id = %order_id, %status, "Simulated step"),
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Simulated step failed");
                break;
            }
        }
    }

    if let Err(e) = orders.end_simulation(order_id.clone(), ticket).await {
        debug!(order_id = %order_id, error = %e, "Could not close simulation");
    }
    let mut running = running.lock();
    if running.get(&order_id).is_some_and(|(current, _)| *current == ticket) {
        running.remove(&order_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::domain::{CheckoutDetails, Order, OrderCreate, OrderLine, OrderStatus};
    use crate::order_actor::next_order_id;
    use rust_decimal::Decimal;

    async fn setup() -> (OrderClient, ProgressionScheduler, String) {
        let (actor, inner) = ResourceActor::<Order>::new(8, next_order_id);
        tokio::spawn(actor.run());
        let orders = OrderClient::new(inner);
        let order = orders
            .create_order(OrderCreate {
                user_id: "c1".into(),
                restaurant_id: "1".into(),
                restaurant_name: "Pizza Palace".into(),
                items: vec![OrderLine {
                    menu_item_id: "A".into(),
                    name: "Margherita".into(),
                    unit_price: Decimal::new(10, 0),
                    quantity: 1,
                }],
                delivery_fee: Decimal::new(299, 2),
                details: CheckoutDetails::new("1 Main St", "555-0100"),
            })
            .await
            .unwrap();
        let scheduler = ProgressionScheduler::new(orders.clone(), ProgressionDelays::default());
        (orders, scheduler, order.id)
    }

    async fn status(orders: &OrderClient, id: &str) -> OrderStatus {
        orders.require_order(id.to_string()).await.unwrap().status
    }

    #[tokio::test(start_paused = true)]
    async fn test_progression_reaches_delivered() {
        let (orders, scheduler, id) = setup().await;
        assert!(scheduler.schedule(id.clone()).await.unwrap());

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(status(&orders, &id).await, OrderStatus::OnTheWay);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(status(&orders, &id).await, OrderStatus::Delivered);
        assert!(!scheduler.is_running(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_advance_beats_pending_step() {
        let (orders, scheduler, id) = setup().await;
        scheduler.schedule(id.clone()).await.unwrap();

        orders.advance(id.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(status(&orders, &id).await, OrderStatus::OnTheWay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_previous_run() {
        let (orders, scheduler, id) = setup().await;
        scheduler.schedule(id.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        scheduler.schedule(id.clone()).await.unwrap();
        assert_eq!(scheduler.active_count(), 1);

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(status(&orders, &id).await, OrderStatus::Preparing);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(status(&orders, &id).await, OrderStatus::OnTheWay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_progression() {
        let (orders, scheduler, id) = setup().await;
        scheduler.schedule(id.clone()).await.unwrap();
        assert!(scheduler.cancel(&id));
        assert!(!scheduler.cancel(&id));

        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(status(&orders, &id).await, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_delivered_order_is_not_scheduled() {
        let (orders, scheduler, id) = setup().await;
        orders.set_status(id.clone(), OrderStatus::Delivered).await.unwrap();
        assert!(!scheduler.schedule(id.clone()).await.unwrap());
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_delays_deserialize_from_millis() {
        let delays: ProgressionDelays =
            serde_json::from_str(r#"{"to_on_the_way_ms":250,"to_delivered_ms":1000}"#).unwrap();
        assert_eq!(delays.to_on_the_way, Duration::from_millis(250));
        assert_eq!(delays.to_delivered, Duration::from_secs(1));
    }
}
