use serde::Serialize;

use crate::domain::Review;

/// What a set of reviews is aggregated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingTarget<'a> {
    MenuItem(&'a str),
    Restaurant(&'a str),
}

impl RatingTarget<'_> {
    fn matches(&self, review: &Review) -> bool {
        match self {
            RatingTarget::MenuItem(id) => review.menu_item_id == *id,
            RatingTarget::Restaurant(id) => review.restaurant_id == *id,
        }
    }
}

/// Average and count of matching reviews. `count == 0` means unrated, and
/// `average` is then 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    pub fn is_rated(&self) -> bool {
        self.count > 0
    }

    /// `"New"` for unrated targets, otherwise the average with one decimal.
    pub fn label(&self) -> String {
        if self.is_rated() {
            format!("{:.1}", self.average)
        } else {
            "New".to_string()
        }
    }
}

pub fn aggregate<'r>(reviews: impl IntoIterator<Item = &'r Review>, target: RatingTarget<'_>) -> RatingSummary {
    let (sum, count) = reviews
        .into_iter()
        .filter(|review| target.matches(review))
        .fold((0u64, 0usize), |(sum, count), review| (sum + u64::from(review.rating), count + 1));

    if count == 0 {
        return RatingSummary::default();
    }
    RatingSummary { average: sum as f64 / count as f64, count }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn review(menu_item_id: &str, restaurant_id: &str, rating: u8) -> Review {
        Review {
            id: format!("{menu_item_id}-{rating}"),
            user_id: "c1".into(),
            user_name: "Demo Customer".into(),
            menu_item_id: menu_item_id.into(),
            restaurant_id: restaurant_id.into(),
            rating,
            comment: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_reviews_is_new() {
        let summary = aggregate(&Vec::<Review>::new(), RatingTarget::MenuItem("A"));
        assert_eq!(summary, RatingSummary { average: 0.0, count: 0 });
        assert_eq!(summary.label(), "New");
    }

    #[test]
    fn test_average_of_matching_reviews() {
        let reviews = vec![review("A", "1", 5), review("A", "1", 3), review("X", "2", 1)];

        let item = aggregate(&reviews, RatingTarget::MenuItem("A"));
        assert_eq!(item, RatingSummary { average: 4.0, count: 2 });
        assert_eq!(item.label(), "4.0");

        let restaurant = aggregate(&reviews, RatingTarget::Restaurant("2"));
        assert_eq!(restaurant.count, 1);
        assert_eq!(restaurant.label(), "1.0");
    }

    #[test]
    fn test_restaurant_rating_spans_its_items() {
        let reviews = vec![review("A", "1", 5), review("B", "1", 4), review("C", "1", 4)];
        let summary = aggregate(&reviews, RatingTarget::Restaurant("1"));
        assert_eq!(summary.count, 3);
        assert_eq!(summary.label(), "4.3");
    }
}
