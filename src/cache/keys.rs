//! Cache key definitions.
//!
//! Keys are plain strings derived only from the query shape, so they are
//! stable across restarts and shared between processes talking to the same
//! backend. Every family prefix ends on a segment boundary: `book:1:` never
//! matches keys of `book:10:`.

use std::fmt;

use crate::pagination::PageRequest;
use crate::store::{BookFilter, ReviewFilter};

/// A fully built cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// `books:page={p}:size={s}[:q={term}]`
    ///
    /// The search segment goes last so arbitrary search text cannot be
    /// mistaken for another segment.
    pub fn book_list(page: &PageRequest, filter: &BookFilter) -> Self {
        let mut key = format!(
            "{}page={}:size={}",
            KeyFamily::Books.prefix(),
            page.page,
            page.size
        );
        if let Some(term) = &filter.search {
            key.push_str(":q=");
            key.push_str(term);
        }
        Self(key)
    }

    /// `book:{id}:detail`
    pub fn book(book_id: i64) -> Self {
        Self(format!("{}detail", KeyFamily::Book(book_id).prefix()))
    }

    /// `book:{id}:reviews:page={p}:size={s}[:min_rating={r}]`
    pub fn review_list(book_id: i64, page: &PageRequest, filter: &ReviewFilter) -> Self {
        let mut key = format!(
            "{}page={}:size={}",
            KeyFamily::BookReviews(book_id).prefix(),
            page.page,
            page.size
        );
        if let Some(min_rating) = filter.min_rating {
            key.push_str(&format!(":min_rating={}", min_rating));
        }
        Self(key)
    }

    /// `book:{id}:stats`
    pub fn review_stats(book_id: i64) -> Self {
        Self(KeyFamily::BookStats(book_id).prefix())
    }

    /// `review:{id}`
    pub fn review(review_id: i64) -> Self {
        Self(format!("review:{}", review_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A group of keys that a write invalidates together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyFamily {
    /// Every book listing page, for every search term
    Books,
    /// Everything cached about one book: detail, review pages, stats
    Book(i64),
    /// Review listing pages of one book
    BookReviews(i64),
    /// Review statistics of one book
    BookStats(i64),
}

impl KeyFamily {
    pub fn prefix(&self) -> String {
        match self {
            KeyFamily::Books => "books:".to_string(),
            KeyFamily::Book(id) => format!("book:{}:", id),
            KeyFamily::BookReviews(id) => format!("book:{}:reviews:", id),
            KeyFamily::BookStats(id) => format!("book:{}:stats", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(page: u32, size: u32) -> PageRequest {
        PageRequest { page, size }
    }

    #[test]
    fn test_book_list_key_is_stable() {
        let filter = BookFilter::new(Some("gatsby"));
        assert_eq!(
            CacheKey::book_list(&page(1, 10), &filter),
            CacheKey::book_list(&page(1, 10), &filter)
        );
        assert_eq!(
            CacheKey::book_list(&page(1, 10), &filter).as_str(),
            "books:page=1:size=10:q=gatsby"
        );
    }

    #[test]
    fn test_search_normalizes_to_same_key() {
        let a = CacheKey::book_list(&page(1, 10), &BookFilter::new(Some("gatsby")));
        let b = CacheKey::book_list(&page(1, 10), &BookFilter::new(Some("Gatsby ")));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_parameter_changes_the_key() {
        let base = CacheKey::book_list(&page(1, 10), &BookFilter::new(None));
        assert_ne!(base, CacheKey::book_list(&page(2, 10), &BookFilter::new(None)));
        assert_ne!(base, CacheKey::book_list(&page(1, 20), &BookFilter::new(None)));
        assert_ne!(base, CacheKey::book_list(&page(1, 10), &BookFilter::new(Some("none"))));
    }

    #[test]
    fn test_blank_search_is_no_search() {
        assert_eq!(
            CacheKey::book_list(&page(1, 10), &BookFilter::new(Some("   "))),
            CacheKey::book_list(&page(1, 10), &BookFilter::new(None))
        );
    }

    #[test]
    fn test_review_keys_live_under_their_book() {
        let key = CacheKey::review_list(7, &page(1, 10), &ReviewFilter::default());
        assert!(key.as_str().starts_with(&KeyFamily::BookReviews(7).prefix()));
        assert!(key.as_str().starts_with(&KeyFamily::Book(7).prefix()));
        assert!(!key.as_str().starts_with(&KeyFamily::Book(70).prefix()));

        let stats = CacheKey::review_stats(7);
        assert!(stats.as_str().starts_with(&KeyFamily::BookStats(7).prefix()));
        assert!(CacheKey::book(7).as_str().starts_with(&KeyFamily::Book(7).prefix()));
    }

    #[test]
    fn test_family_prefixes_do_not_overlap_between_books() {
        let one = KeyFamily::Book(1).prefix();
        assert!(!CacheKey::book(10).as_str().starts_with(&one));
        assert!(!CacheKey::review_stats(12).as_str().starts_with(&one));
        assert!(!CacheKey::review_stats(1)
            .as_str()
            .starts_with(&KeyFamily::Books.prefix()));
    }

    #[test]
    fn test_min_rating_changes_review_key() {
        let none = CacheKey::review_list(1, &page(1, 10), &ReviewFilter::default());
        let some = CacheKey::review_list(1, &page(1, 10), &ReviewFilter { min_rating: Some(4.5) });
        assert_ne!(none, some);
        assert_eq!(some.as_str(), "book:1:reviews:page=1:size=10:min_rating=4.5");
    }
}
