//! Review statistics for a single book.

use serde::{Deserialize, Serialize};

/// Raw aggregate as computed by the data store.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReviewAggregate {
    pub count: u64,
    pub sum: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ReviewAggregate {
    /// Folds one more rating into the aggregate.
    pub fn push(&mut self, rating: f64) {
        self.count += 1;
        self.sum += rating;
        self.min = Some(self.min.map_or(rating, |m| m.min(rating)));
        self.max = Some(self.max.map_or(rating, |m| m.max(rating)));
    }
}

/// Review statistics as returned to callers.
///
/// A book without reviews reports `0.0` for average, min and max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub book_id: i64,
    pub total_reviews: u64,
    pub average_rating: f64,
    pub min_rating: f64,
    pub max_rating: f64,
}

impl ReviewStats {
    /// Builds the caller-facing stats. The average is rounded to two decimals.
    pub fn from_aggregate(book_id: i64, aggregate: ReviewAggregate) -> Self {
        if aggregate.count == 0 {
            return Self {
                book_id,
                total_reviews: 0,
                average_rating: 0.0,
                min_rating: 0.0,
                max_rating: 0.0,
            };
        }

        let average = aggregate.sum / aggregate.count as f64;
        Self {
            book_id,
            total_reviews: aggregate.count,
            average_rating: (average * 100.0).round() / 100.0,
            min_rating: aggregate.min.unwrap_or(0.0),
            max_rating: aggregate.max.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregate_reports_zeroes() {
        let stats = ReviewStats::from_aggregate(3, ReviewAggregate::default());
        assert_eq!(stats.total_reviews, 0);
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.min_rating, 0.0);
        assert_eq!(stats.max_rating, 0.0);
    }

    #[test]
    fn test_single_rating() {
        let mut aggregate = ReviewAggregate::default();
        aggregate.push(4.5);

        let stats = ReviewStats::from_aggregate(1, aggregate);
        assert_eq!(stats.total_reviews, 1);
        assert_eq!(stats.average_rating, 4.5);
        assert_eq!(stats.min_rating, 4.5);
        assert_eq!(stats.max_rating, 4.5);
    }

    #[test]
    fn test_average_rounds_to_two_decimals() {
        let mut aggregate = ReviewAggregate::default();
        for rating in [5.0, 4.0, 4.0] {
            aggregate.push(rating);
        }

        let stats = ReviewStats::from_aggregate(1, aggregate);
        assert_eq!(stats.average_rating, 4.33);
        assert_eq!(stats.min_rating, 4.0);
        assert_eq!(stats.max_rating, 5.0);
    }
}
