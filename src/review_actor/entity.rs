use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::error::ReviewError;
use crate::actor_framework::Entity;
use crate::domain::{Review, ReviewCreate};

pub fn next_review_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Reviews are append-only, so no action exists that could change one.
#[derive(Debug, Clone)]
pub enum ReviewAction {}

impl Entity for Review {
    type Id = String;
    type CreateParams = ReviewCreate;
    type Action = ReviewAction;
    type ActionResult = ();
    type Error = ReviewError;

    fn id(&self) -> &String { &self.id }

    fn from_create_params(id: String, params: ReviewCreate) -> Result<Self, ReviewError> {
        check_rating(params.rating)?;
        let comment = params
            .comment
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(Self {
            id,
            user_id: params.user_id,
            user_name: params.user_name,
            menu_item_id: params.menu_item_id,
            restaurant_id: params.restaurant_id,
            rating: params.rating,
            comment,
            created_at: Utc::now(),
        })
    }

    fn on_create(&mut self) -> Result<(), ReviewError> {
        info!(review_id = %self.id, menu_item_id = %self.menu_item_id, rating = self.rating, "Review recorded");
        Ok(())
    }

    fn check_restored(&self) -> Result<(), ReviewError> {
        check_rating(self.rating)
    }

    fn handle_action(&mut self, action: ReviewAction) -> Result<(), ReviewError> {
        match action {}
    }
}

fn check_rating(rating: u8) -> Result<(), ReviewError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ReviewError::InvalidRating(rating))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(rating: u8, comment: Option<&str>) -> ReviewCreate {
        ReviewCreate {
            user_id: "c1".into(),
            user_name: "Demo Customer".into(),
            menu_item_id: "A".into(),
            restaurant_id: "1".into(),
            rating,
            comment: comment.map(str::to_string),
        }
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Review::from_create_params("r".into(), params(0, None)).unwrap_err(), ReviewError::InvalidRating(0));
        assert_eq!(Review::from_create_params("r".into(), params(6, None)).unwrap_err(), ReviewError::InvalidRating(6));
        assert_eq!(Review::from_create_params("r".into(), params(5, None)).unwrap().rating, 5);
    }

    #[test]
    fn test_blank_comment_is_dropped() {
        let review = Review::from_create_params("r".into(), params(3, Some("   "))).unwrap();
        assert_eq!(review.comment, None);
        let review = Review::from_create_params("r".into(), params(3, Some(" Crispy "))).unwrap();
        assert_eq!(review.comment.as_deref(), Some("Crispy"));
    }

    #[test]
    fn test_stored_rating_out_of_range_fails_check() {
        let mut review = Review::from_create_params("r".into(), params(4, None)).unwrap();
        assert_eq!(review.check_restored(), Ok(()));
        review.rating = 9;
        assert_eq!(review.check_restored(), Err(ReviewError::InvalidRating(9)));
    }
}
