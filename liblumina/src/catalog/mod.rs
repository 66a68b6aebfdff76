//! External book catalog
//!
//! Lumina looks books up in a third-party metadata API. This module defines
//! the [`CatalogSource`] seam, the HTTP implementation ([`isbndb::IsbnDbClient`])
//! and the mapping from the API's flat records into [`crate::Book`].
//!
//! Errors here are typed as [`CatalogError`] and stop at the service boundary:
//! `CatalogService` logs them and hands back empty results.
//!
//! ```no_run
//! use liblumina::catalog::{CatalogSource, isbndb::IsbnDbClient, mapper::map_external_book};
//! use liblumina::config::CatalogConfig;
//!
//! # async fn example() -> Result<(), liblumina::error::CatalogError> {
//! let client = IsbnDbClient::from_config(&CatalogConfig::default())?;
//! for record in client.search("machado de assis", 1, 10).await? {
//!     let book = map_external_book(record);
//!     println!("{} - {}", book.title, book.author);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::CatalogError;

pub mod isbndb;
pub mod mapper;

// Available outside tests so integration suites can drive the services offline
pub mod mock;

pub use mapper::{map_external_book, ExternalBook};

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// A read-only source of book metadata
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Search by free text, one page at a time (pages start at 1)
    ///
    /// A blank query yields an empty list without contacting the source.
    async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: usize,
    ) -> CatalogResult<Vec<ExternalBook>>;

    /// Fetch exactly one record by ISBN-10 or ISBN-13
    ///
    /// Returns `Ok(None)` when the source has no such book.
    async fn fetch_by_isbn(&self, isbn: &str) -> CatalogResult<Option<ExternalBook>>;
}

/// Strip separators from an ISBN-like identifier
///
/// Returns `None` when nothing usable remains.
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Whether a string looks like an ISBN-10 or ISBN-13 after normalization
pub fn looks_like_isbn(raw: &str) -> bool {
    match normalize_isbn(raw) {
        Some(isbn) if isbn.len() == 13 => isbn.chars().all(|c| c.is_ascii_digit()),
        Some(isbn) if isbn.len() == 10 => {
            let (body, check) = isbn.split_at(9);
            body.chars().all(|c| c.is_ascii_digit())
                && check.chars().all(|c| c.is_ascii_digit() || c == 'X')
        }
        _ => false,
    }
}
