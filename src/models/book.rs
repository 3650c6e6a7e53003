//! Book entity and its write payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest accepted title or author.
pub const MAX_NAME_LENGTH: usize = 255;
/// Longest accepted ISBN.
pub const MAX_ISBN_LENGTH: usize = 20;
/// Accepted publication years.
pub const PUBLICATION_YEARS: std::ops::RangeInclusive<i32> = 1000..=2030;

/// A persisted book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub publication_year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a book.
///
/// Missing `title`/`author` deserialize as empty strings so that they are
/// reported by [`validate`](Self::validate) rather than by the JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewBook {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        check_name("title", &self.title)
            .or_else(|| check_name("author", &self.author))
            .or_else(|| check_isbn(self.isbn.as_deref()))
            .or_else(|| check_year(self.publication_year))
    }

    /// Trims text fields and drops a blank ISBN.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: normalize_isbn(self.isbn),
            description: self.description,
            publication_year: self.publication_year,
        }
    }
}

/// Request body for a partial book update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BookUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
}

impl BookUpdate {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        self.title
            .as_deref()
            .and_then(|title| check_name("title", title))
            .or_else(|| self.author.as_deref().and_then(|a| check_name("author", a)))
            .or_else(|| check_isbn(self.isbn.as_deref()))
            .or_else(|| check_year(self.publication_year))
    }

    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|t| t.trim().to_string()),
            author: self.author.map(|a| a.trim().to_string()),
            isbn: normalize_isbn(self.isbn),
            description: self.description,
            publication_year: self.publication_year,
        }
    }

    /// Applies the present fields to `book`. Timestamps are the caller's job.
    pub fn apply_to(&self, book: &mut Book) {
        if let Some(title) = &self.title {
            book.title = title.clone();
        }
        if let Some(author) = &self.author {
            book.author = author.clone();
        }
        if let Some(isbn) = &self.isbn {
            book.isbn = Some(isbn.clone());
        }
        if let Some(description) = &self.description {
            book.description = Some(description.clone());
        }
        if let Some(year) = self.publication_year {
            book.publication_year = Some(year);
        }
    }
}

fn check_name(field: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return Some(format!("{} is required", field));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Some(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_NAME_LENGTH
        ));
    }
    None
}

fn check_isbn(isbn: Option<&str>) -> Option<String> {
    match isbn {
        Some(isbn) if isbn.trim().chars().count() > MAX_ISBN_LENGTH => Some(format!(
            "isbn exceeds maximum length of {} characters",
            MAX_ISBN_LENGTH
        )),
        _ => None,
    }
}

fn check_year(year: Option<i32>) -> Option<String> {
    match year {
        Some(year) if !PUBLICATION_YEARS.contains(&year) => Some(format!(
            "publication_year must be between {} and {}",
            PUBLICATION_YEARS.start(),
            PUBLICATION_YEARS.end()
        )),
        _ => None,
    }
}

fn normalize_isbn(isbn: Option<String>) -> Option<String> {
    isbn.map(|i| i.trim().to_string()).filter(|i| !i.is_empty())
}
