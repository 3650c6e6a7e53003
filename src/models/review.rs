//! Review entity and its write payloads.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::book::MAX_NAME_LENGTH;

/// Lowest accepted rating.
pub const MIN_RATING: f64 = 1.0;
/// Highest accepted rating.
pub const MAX_RATING: f64 = 5.0;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// A persisted review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub book_id: i64,
    pub reviewer_name: String,
    pub reviewer_email: Option<String>,
    pub rating: f64,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a review.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewReview {
    #[serde(default)]
    pub reviewer_name: String,
    #[serde(default)]
    pub reviewer_email: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_text: Option<String>,
}

impl NewReview {
    pub fn new(reviewer_name: impl Into<String>, rating: f64) -> Self {
        Self {
            reviewer_name: reviewer_name.into(),
            rating: Some(rating),
            ..Self::default()
        }
    }

    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        check_reviewer_name(&self.reviewer_name)
            .or_else(|| check_email(self.reviewer_email.as_deref()))
            .or_else(|| match self.rating {
                Some(rating) => check_rating(rating),
                None => Some("rating is required".to_string()),
            })
    }

    /// Trims text fields, drops a blank email and rounds the rating to one decimal.
    pub fn normalized(self) -> Self {
        Self {
            reviewer_name: self.reviewer_name.trim().to_string(),
            reviewer_email: normalize_email(self.reviewer_email),
            rating: self.rating.map(round_rating),
            review_text: self.review_text,
        }
    }
}

/// Request body for a partial review update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReviewUpdate {
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub reviewer_email: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_text: Option<String>,
}

impl ReviewUpdate {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        self.reviewer_name
            .as_deref()
            .and_then(check_reviewer_name)
            .or_else(|| check_email(self.reviewer_email.as_deref()))
            .or_else(|| self.rating.and_then(check_rating))
    }

    pub fn normalized(self) -> Self {
        Self {
            reviewer_name: self.reviewer_name.map(|n| n.trim().to_string()),
            reviewer_email: normalize_email(self.reviewer_email),
            rating: self.rating.map(round_rating),
            review_text: self.review_text,
        }
    }

    /// Applies the present fields to `review`. Timestamps are the caller's job.
    pub fn apply_to(&self, review: &mut Review) {
        if let Some(name) = &self.reviewer_name {
            review.reviewer_name = name.clone();
        }
        if let Some(email) = &self.reviewer_email {
            review.reviewer_email = Some(email.clone());
        }
        if let Some(rating) = self.rating {
            review.rating = rating;
        }
        if let Some(text) = &self.review_text {
            review.review_text = Some(text.clone());
        }
    }
}

/// Checks that a rating lies in `[MIN_RATING, MAX_RATING]`.
pub fn check_rating(rating: f64) -> Option<String> {
    if rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&rating) {
        None
    } else {
        Some(format!(
            "rating must be between {:.1} and {:.1}",
            MIN_RATING, MAX_RATING
        ))
    }
}

/// Rounds a rating to one decimal place, half away from zero.
pub fn round_rating(rating: f64) -> f64 {
    (rating * 10.0).round() / 10.0
}

fn check_reviewer_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        Some("reviewer_name is required".to_string())
    } else if name.chars().count() > MAX_NAME_LENGTH {
        Some(format!(
            "reviewer_name exceeds maximum length of {} characters",
            MAX_NAME_LENGTH
        ))
    } else {
        None
    }
}

fn check_email(email: Option<&str>) -> Option<String> {
    match email.map(str::trim) {
        Some(email) if !email.is_empty() && !EMAIL_RE.is_match(email) => {
            Some(format!("'{}' is not a valid email address", email))
        }
        _ => None,
    }
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(NewReview::new("John", 0.9).validate().is_some());
        assert!(NewReview::new("John", 5.1).validate().is_some());
        assert!(NewReview::new("John", 1.0).validate().is_none());
        assert!(NewReview::new("John", 5.0).validate().is_none());
        assert!(NewReview::new("John", f64::NAN).validate().is_some());
    }

    #[test]
    fn test_missing_rating() {
        let review: NewReview = serde_json::from_str(r#"{"reviewer_name": "John"}"#).unwrap();
        assert_eq!(review.validate(), Some("rating is required".to_string()));
    }

    #[test]
    fn test_reviewer_name_required() {
        assert_eq!(
            NewReview::new(" ", 3.0).validate(),
            Some("reviewer_name is required".to_string())
        );
    }

    #[test]
    fn test_email_validation() {
        let mut review = NewReview::new("John", 4.0);

        review.reviewer_email = Some("john@example.com".to_string());
        assert!(review.validate().is_none());

        review.reviewer_email = Some("not-an-email".to_string());
        assert!(review.validate().unwrap().contains("email"));

        review.reviewer_email = Some("john@localhost".to_string());
        assert!(review.validate().is_some());
    }

    #[test]
    fn test_normalized_rounds_rating() {
        let review = NewReview::new(" John ", 4.26).normalized();
        assert_eq!(review.rating, Some(4.3));
        assert_eq!(review.reviewer_name, "John");
        assert_eq!(round_rating(4.96), 5.0);
    }

    #[test]
    fn test_update_validation() {
        assert!(ReviewUpdate::default().validate().is_none());
        let bad = ReviewUpdate {
            rating: Some(6.0),
            ..ReviewUpdate::default()
        };
        assert!(bad.validate().is_some());
    }
}
