//! Book discovery
//!
//! Wraps a [`CatalogSource`] so that catalog failures never reach callers:
//! they are logged and turned into empty results.

use std::sync::Arc;

use crate::catalog::{looks_like_isbn, map_external_book, normalize_isbn, CatalogSource};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::seed;
use crate::types::Book;

#[derive(Clone)]
pub struct CatalogService {
    source: Option<Arc<dyn CatalogSource>>,
    page_size: usize,
}

impl CatalogService {
    /// `source` is `None` when no catalog is configured; searches then come
    /// back empty.
    pub fn new(source: Option<Arc<dyn CatalogSource>>, page_size: usize) -> Self {
        Self {
            source,
            page_size: if page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// First page of results for `query`
    pub async fn search(&self, query: &str) -> Vec<Book> {
        self.search_page(query, 1).await
    }

    /// One page of results for `query`
    ///
    /// Blank queries return nothing without touching the catalog.
    pub async fn search_page(&self, query: &str, page: u32) -> Vec<Book> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let Some(source) = &self.source else {
            tracing::debug!("catalog not configured, search skipped");
            return Vec::new();
        };

        match source.search(query, page.max(1), self.page_size).await {
            Ok(records) => records
                .into_iter()
                .take(self.page_size)
                .map(map_external_book)
                .collect(),
            Err(e) => {
                tracing::warn!(source = source.name(), query, error = %e, "catalog search failed");
                Vec::new()
            }
        }
    }

    /// Look a single book up by ISBN
    ///
    /// Returns `None` when the ISBN is blank, unknown, or the lookup fails.
    pub async fn lookup_isbn(&self, isbn: &str) -> Option<Book> {
        let isbn = normalize_isbn(isbn)?;
        let source = self.source.as_ref()?;

        match source.fetch_by_isbn(&isbn).await {
            Ok(record) => record.map(map_external_book),
            Err(e) => {
                tracing::warn!(source = source.name(), %isbn, error = %e, "catalog lookup failed");
                None
            }
        }
    }

    /// The built-in catalog
    pub fn seed_books(&self) -> Vec<Book> {
        seed::seed_books()
    }

    /// Resolve a book id: a seed slug first, then an ISBN lookup
    ///
    /// Catalog records without an ISBN carry a slug of their title as id;
    /// those are found again by searching for the title.
    pub async fn find(&self, id: &str) -> Option<Book> {
        let id = id.trim();
        if let Some(book) = seed::find_seed_book(id) {
            return Some(book);
        }
        if looks_like_isbn(id) {
            return self.lookup_isbn(id).await;
        }
        self.search(&id.replace('-', " "))
            .await
            .into_iter()
            .find(|book| book.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mapper::ExternalBook;
    use crate::catalog::mock::MockCatalog;
    use crate::error::CatalogError;

    fn record(title: &str, isbn13: &str) -> ExternalBook {
        ExternalBook {
            title: Some(title.to_string()),
            isbn13: Some(isbn13.to_string()),
            authors: Some(vec!["Frank Herbert".to_string()]),
            ..Default::default()
        }
    }

    fn service(mock: &MockCatalog, page_size: usize) -> CatalogService {
        CatalogService::new(Some(Arc::new(mock.clone())), page_size)
    }

    #[tokio::test]
    async fn test_blank_query_makes_no_call() {
        let mock = MockCatalog::with_books(vec![record("Dune", "9780441013593")]);
        let catalog = service(&mock, 20);

        assert!(catalog.search("").await.is_empty());
        assert!(catalog.search("   \t").await.is_empty());
        assert_eq!(mock.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_search_maps_records() {
        let mock = MockCatalog::with_books(vec![record("Dune", "9780441013593")]);
        let books = service(&mock, 20).search("dune").await;

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, "9780441013593");
        assert_eq!(books[0].author, "Frank Herbert");
        assert_eq!(mock.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_results_capped_at_page_size() {
        let records = (0..5)
            .map(|i| record(&format!("Dune {}", i), &format!("978044101359{}", i)))
            .collect();
        let mock = MockCatalog::with_books(records);
        assert_eq!(service(&mock, 2).search("dune").await.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_become_empty() {
        let mock = MockCatalog::failing(CatalogError::Status {
            status: 503,
            message: "unavailable".to_string(),
        });
        let catalog = service(&mock, 20);

        assert!(catalog.search("dune").await.is_empty());
        assert!(catalog.lookup_isbn("9780441013593").await.is_none());
        assert_eq!(mock.lookup_calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_isbn_makes_no_call() {
        let mock = MockCatalog::default();
        assert!(service(&mock, 20).lookup_isbn("  ").await.is_none());
        assert_eq!(mock.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_catalog() {
        let catalog = CatalogService::new(None, 0);
        assert!(!catalog.is_configured());
        assert_eq!(catalog.page_size(), DEFAULT_PAGE_SIZE);
        assert!(catalog.search("dune").await.is_empty());
        assert_eq!(catalog.seed_books().len(), 6);
    }

    #[tokio::test]
    async fn test_find_prefers_seed_then_isbn() {
        let mock = MockCatalog::with_books(vec![record("Dune", "9780441013593")]);
        let catalog = service(&mock, 20);

        assert_eq!(catalog.find("dom-casmurro").await.unwrap().title, "Dom Casmurro");
        assert_eq!(mock.lookup_calls(), 0);

        assert_eq!(catalog.find("978-0441013593").await.unwrap().title, "Dune");
        assert!(catalog.find("no-such-book").await.is_none());
        assert_eq!(mock.lookup_calls(), 1);
    }

    #[tokio::test]
    async fn test_find_record_without_isbn_by_slug() {
        let untagged = ExternalBook {
            title: Some("Sertao Sem Fim".to_string()),
            ..Default::default()
        };
        let mock = MockCatalog::with_books(vec![untagged, record("Dune", "9780441013593")]);
        let catalog = service(&mock, 20);

        let found = catalog.search("sertao").await;
        assert_eq!(found[0].id, "sertao-sem-fim");

        let book = catalog.find("sertao-sem-fim").await.unwrap();
        assert_eq!(book.title, "Sertao Sem Fim");
        assert_eq!(mock.lookup_calls(), 0);
    }
}
