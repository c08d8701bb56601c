use tracing::{debug, instrument};
use crate::actor_framework::ResourceClient;
use crate::domain::{Order, OrderCreate, OrderStatus};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};

/// Client for interacting with the Order actor.
///
/// Ownership and role checks happen in the coordinator before a request is
/// sent here; this client only speaks the actor's protocol.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl_basic_client!(OrderClient, Order, OrderError, order);

impl OrderClient {
    #[instrument(skip(self, params), fields(user_id = %params.user_id))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.inner.create(params).await
    }

    /// Fetches an order, turning an unknown id into `OrderNotFound`.
    pub async fn require_order(&self, id: String) -> Result<Order, OrderError> {
        self.get_order(id.clone()).await?.ok_or(OrderError::OrderNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn advance(&self, id: String) -> Result<OrderStatus, OrderError> {
        debug!("Sending request");
        let result = self.inner.perform_action(id, OrderAction::Advance).await?;
        expect_status(result)
    }

    #[instrument(skip(self))]
    pub async fn set_status(&self, id: String, status: OrderStatus) -> Result<OrderStatus, OrderError> {
        debug!("Sending request");
        let result = self.inner.perform_action(id, OrderAction::SetStatus(status)).await?;
        expect_status(result)
    }

    /// Returns `false` when the order is already delivered and nothing was registered.
    #[instrument(skip(self))]
    pub async fn begin_simulation(&self, id: String, ticket: u64) -> Result<bool, OrderError> {
        match self.inner.perform_action(id, OrderAction::BeginSimulation(ticket)).await? {
            OrderActionResult::Simulation(started) => Ok(started),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn simulated_advance(&self, id: String, ticket: u64) -> Result<OrderStatus, OrderError> {
        let result = self.inner.perform_action(id, OrderAction::SimulatedAdvance(ticket)).await?;
        expect_status(result)
    }

    #[instrument(skip(self))]
    pub async fn end_simulation(&self, id: String, ticket: u64) -> Result<(), OrderError> {
        self.inner.perform_action(id, OrderAction::EndSimulation(ticket)).await?;
        Ok(())
    }

    #[instrument(skip(self, review))]
    pub async fn attach_rating(
        &self,
        id: String,
        user_id: String,
        rating: u8,
        review: Option<String>,
    ) -> Result<u8, OrderError> {
        debug!("Sending request");
        let action = OrderAction::AttachRating { user_id, rating, review };
        match self.inner.perform_action(id, action).await? {
            OrderActionResult::Rated { rating } => Ok(rating),
            other => Err(unexpected(other)),
        }
    }
}

fn expect_status(result: OrderActionResult) -> Result<OrderStatus, OrderError> {
    result.status().ok_or_else(|| unexpected(result))
}

fn unexpected(result: OrderActionResult) -> OrderError {
    OrderError::ActorCommunicationError(format!("Unexpected result: {result:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::domain::{CheckoutDetails, OrderLine};
    use crate::order_actor::next_order_id;
    use rust_decimal::Decimal;

    fn spawn_orders() -> OrderClient {
        let (actor, inner) = ResourceActor::<Order>::new(8, next_order_id);
        tokio::spawn(actor.run());
        OrderClient::new(inner)
    }

    fn params() -> OrderCreate {
        OrderCreate {
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
        }
    }

    #[tokio::test]
    async fn test_create_and_advance() {
        let client = spawn_orders();
        let order = client.create_order(params()).await.unwrap();
        assert_eq!(order.total, Decimal::new(1299, 2));

        assert_eq!(client.advance(order.id.clone()).await.unwrap(), OrderStatus::OnTheWay);
        let stored = client.require_order(order.id).await.unwrap();
        assert_eq!(stored.status, OrderStatus::OnTheWay);
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let client = spawn_orders();
        let err = client.advance("ORD-MISSING".into()).await.unwrap_err();
        assert_eq!(err, OrderError::OrderNotFound("ORD-MISSING".into()));
        let err = client.require_order("ORD-MISSING".into()).await.unwrap_err();
        assert_eq!(err, OrderError::OrderNotFound("ORD-MISSING".into()));
    }
}
