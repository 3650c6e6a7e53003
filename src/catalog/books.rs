//! Book reads and writes.

use tracing::info;

use super::{store_failure, validated, Catalog};
use crate::cache::{CacheKey, CacheLookup, KeyFamily};
use crate::error::{Result, ServiceError};
use crate::models::{Book, BookUpdate, NewBook};
use crate::pagination::Page;
use crate::store::{BookFilter, StoreError};

impl Catalog {
    // == List Books ==
    /// Lists books, optionally filtered by a case-insensitive search over
    /// title and author. Out-of-range paging input is clamped.
    pub async fn list_books(
        &self,
        page: Option<i64>,
        size: Option<i64>,
        search: Option<&str>,
    ) -> Result<Page<Book>> {
        let request = self.paginator.request(page, size);
        let filter = BookFilter::new(search);
        let key = CacheKey::book_list(&request, &filter);

        match self.cache.get::<Page<Book>>(&key).await {
            CacheLookup::Hit(page) => return Ok(page),
            CacheLookup::Miss | CacheLookup::Unavailable(_) => {}
        }

        let (rows, total) = self
            .store
            .query_books(&filter, request.offset(), request.limit())
            .await
            .map_err(store_failure("query_books"))?;

        let page = Page::assemble(rows, &request, total);
        self.cache.set(&key, &page, None).await;
        Ok(page)
    }

    // == Get Book ==
    pub async fn get_book(&self, id: i64) -> Result<Book> {
        let key = CacheKey::book(id);

        match self.cache.get::<Book>(&key).await {
            CacheLookup::Hit(book) => return Ok(book),
            CacheLookup::Miss | CacheLookup::Unavailable(_) => {}
        }

        let book = self
            .store
            .find_book(id)
            .await
            .map_err(store_failure("find_book"))?
            .ok_or_else(|| ServiceError::from(StoreError::book_not_found(id)))?;

        self.cache.set(&key, &book, None).await;
        Ok(book)
    }

    // == Create Book ==
    /// Creates a book and drops every cached book listing.
    pub async fn create_book(&self, fields: NewBook) -> Result<Book> {
        validated(fields.validate())?;

        let book = self
            .store
            .insert_book(fields.normalized())
            .await
            .map_err(store_failure("insert_book"))?;
        info!(book_id = book.id, "created book");

        self.invalidate(&[KeyFamily::Books], &[]).await;
        Ok(book)
    }

    // == Update Book ==
    pub async fn update_book(&self, id: i64, patch: BookUpdate) -> Result<Book> {
        validated(patch.validate())?;

        let book = self
            .store
            .update_book(id, patch.normalized())
            .await
            .map_err(store_failure("update_book"))?;
        info!(book_id = id, "updated book");

        self.invalidate(&[KeyFamily::Books], &[CacheKey::book(id)]).await;
        Ok(book)
    }

    // == Delete Book ==
    /// Deletes a book with its reviews and drops everything cached about them.
    pub async fn delete_book(&self, id: i64) -> Result<()> {
        let cascaded = self
            .store
            .delete_book(id)
            .await
            .map_err(store_failure("delete_book"))?;
        info!(book_id = id, reviews = cascaded.len(), "deleted book");

        let review_keys: Vec<CacheKey> = cascaded.into_iter().map(CacheKey::review).collect();
        self.invalidate(&[KeyFamily::Books, KeyFamily::Book(id)], &review_keys)
            .await;
        Ok(())
    }
}
