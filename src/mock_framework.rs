//! # Mock Framework
//!
//! Drives a [`ResourceClient`] from the test side: the client's requests land
//! on a receiver the test owns, and the test answers them by hand.

use crate::actor_framework::{Entity, ResourceClient, ResourceRequest, Response};
use tokio::sync::mpsc;

pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next message, if it is a Create request.
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Response<T, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_list<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<Response<Vec<T>, T::Error>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{OrderClient, ReviewClient};
    use crate::domain::{Order, OrderStatus, Review, ReviewCreate};
    use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
    use crate::review_actor::ReviewError;

    #[tokio::test]
    async fn test_advance_maps_transition_result() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);
        let task = tokio::spawn(async move { client.advance("ORD-1".to_string()).await });

        let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Order Action");
        assert_eq!(id, "ORD-1");
        assert!(matches!(action, OrderAction::Advance));
        responder
            .send(Ok(OrderActionResult::Transition { from: OrderStatus::Preparing, to: OrderStatus::OnTheWay }))
            .unwrap();

        assert_eq!(task.await.unwrap(), Ok(OrderStatus::OnTheWay));
    }

    #[tokio::test]
    async fn test_unexpected_action_result_is_reported() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);
        let task = tokio::spawn(async move {
            client.attach_rating("ORD-1".into(), "c1".into(), 5, None).await
        });

        let (_, action, responder) = expect_action(&mut receiver).await.expect("Expected Order Action");
        assert!(matches!(action, OrderAction::AttachRating { rating: 5, .. }));
        responder.send(Ok(OrderActionResult::Simulation(true))).unwrap();

        assert!(matches!(task.await.unwrap(), Err(OrderError::ActorCommunicationError(_))));
    }

    #[tokio::test]
    async fn test_dropped_responder_maps_to_communication_error() {
        let (inner, mut receiver) = create_mock_client::<Review>(4);
        let client = ReviewClient::new(inner);
        let task = tokio::spawn(async move { client.list_reviews().await });

        let responder = expect_list(&mut receiver).await.expect("Expected Review List");
        drop(responder);

        assert!(matches!(task.await.unwrap(), Err(ReviewError::ActorCommunicationError(_))));
    }

    #[tokio::test]
    async fn test_create_review_forwards_params() {
        let (inner, mut receiver) = create_mock_client::<Review>(4);
        let client = ReviewClient::new(inner);
        let task = tokio::spawn(async move {
            client
                .create_review(ReviewCreate {
                    user_id: "c1".into(),
                    user_name: "Demo Customer".into(),
                    menu_item_id: "A".into(),
                    restaurant_id: "1".into(),
                    rating: 4,
                    comment: None,
                })
                .await
        });

        let (params, responder) = expect_create(&mut receiver).await.expect("Expected Review Create");
        assert_eq!(params.menu_item_id, "A");
        responder.send(Err(ReviewError::InvalidRating(params.rating))).unwrap();

        assert_eq!(task.await.unwrap().unwrap_err(), ReviewError::InvalidRating(4));
    }

    #[tokio::test]
    async fn test_get_order_returns_none_for_unknown_id() {
        let (inner, mut receiver) = create_mock_client::<Order>(4);
        let client = OrderClient::new(inner);
        let task = tokio::spawn(async move { client.get_order("ORD-X".into()).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Order Get");
        assert_eq!(id, "ORD-X");
        responder.send(Ok(None)).unwrap();

        assert_eq!(task.await.unwrap(), Ok(None));
    }
}
