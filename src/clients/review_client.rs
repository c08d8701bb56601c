use tracing::{debug, instrument};
use crate::actor_framework::ResourceClient;
use crate::domain::{Review, ReviewCreate};
use crate::review_actor::ReviewError;

/// Client for interacting with the Review actor.
#[derive(Clone)]
pub struct ReviewClient {
    inner: ResourceClient<Review>,
}

impl_basic_client!(ReviewClient, Review, ReviewError, review);

impl ReviewClient {
    #[instrument(skip(self, params), fields(menu_item_id = %params.menu_item_id))]
    pub async fn create_review(&self, params: ReviewCreate) -> Result<Review, ReviewError> {
        debug!("Sending request");
        self.inner.create(params).await
    }
}
