//! In-memory catalog for tests
//!
//! `MockCatalog` answers from a fixed list of records and counts how often it
//! is called, so tests can check both results and whether the network would
//! have been touched.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

use super::mapper::ExternalBook;
use super::{normalize_isbn, CatalogResult, CatalogSource};
use crate::error::CatalogError;

#[derive(Debug, Clone, Default)]
pub struct MockCatalog {
    books: Vec<ExternalBook>,
    failure: Option<CatalogError>,
    search_calls: Arc<Mutex<usize>>,
    lookup_calls: Arc<Mutex<usize>>,
}

impl MockCatalog {
    /// A catalog holding `books`
    pub fn with_books(books: Vec<ExternalBook>) -> Self {
        Self {
            books,
            ..Default::default()
        }
    }

    /// A catalog whose every call fails with `error`
    pub fn failing(error: CatalogError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn search_calls(&self) -> usize {
        *self.search_calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lookup_calls(&self) -> usize {
        *self.lookup_calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn matches(book: &ExternalBook, needle: &str) -> bool {
        let title = book.title.as_deref().unwrap_or_default().to_lowercase();
        let authors = book
            .authors
            .as_deref()
            .unwrap_or_default()
            .join(" ")
            .to_lowercase();
        title.contains(needle) || authors.contains(needle)
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: usize,
    ) -> CatalogResult<Vec<ExternalBook>> {
        *self.search_calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let needle = query.trim().to_lowercase();
        let skip = (page.max(1) as usize - 1) * page_size;
        Ok(self
            .books
            .iter()
            .filter(|b| Self::matches(b, &needle))
            .skip(skip)
            .take(page_size)
            .cloned()
            .collect())
    }

    async fn fetch_by_isbn(&self, isbn: &str) -> CatalogResult<Option<ExternalBook>> {
        *self.lookup_calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let wanted = normalize_isbn(isbn);
        Ok(self
            .books
            .iter()
            .find(|b| {
                wanted.is_some()
                    && (b.isbn13.as_deref().and_then(normalize_isbn) == wanted
                        || b.isbn.as_deref().and_then(normalize_isbn) == wanted)
            })
            .cloned())
    }
}
