//! HTTP client for the ISBNdb book-metadata API
//!
//! Two read-only endpoints are used:
//!
//! - `GET {base}/books/{query}?page=&pageSize=` for free-text search
//! - `GET {base}/book/{isbn}` for a single record
//!
//! Both need the API key in the `Authorization` header. Requests use a fixed
//! timeout and are never retried.

use async_trait::async_trait;
use reqwest::{header, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use super::mapper::{BookResponse, ExternalBook, SearchResponse};
use super::{normalize_isbn, CatalogResult, CatalogSource};
use crate::config::CatalogConfig;
use crate::error::CatalogError;

const USER_AGENT: &str = concat!(
    "Lumina/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/lumina-reader/lumina)"
);

/// Map transport failures into catalog errors
fn map_reqwest_error(error: reqwest::Error, context: &str) -> CatalogError {
    if error.is_timeout() {
        return CatalogError::Network(format!("{} timed out: {}", context, error));
    }
    if error.is_decode() {
        return CatalogError::Decode(format!("{}: {}", context, error));
    }
    if let Some(status) = error.status() {
        return CatalogError::Status {
            status: status.as_u16(),
            message: format!("{}: {}", context, error),
        };
    }
    CatalogError::Network(format!("{}: {}", context, error))
}

pub struct IsbnDbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl IsbnDbClient {
    /// Create a client for `base_url` with a fixed per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> CatalogResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build a client from the `[catalog]` section
    ///
    /// Fails with `NotConfigured` when no API key is available.
    pub fn from_config(config: &CatalogConfig) -> CatalogResult<Self> {
        let api_key = config.resolved_api_key().ok_or_else(|| {
            CatalogError::NotConfigured(format!(
                "no API key (set catalog.api_key or {})",
                crate::config::CATALOG_API_KEY_ENV
            ))
        })?;

        Self::new(
            config.base_url.clone(),
            SecretString::from(api_key),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> CatalogResult<Option<String>> {
        let response = self
            .http
            .get(url)
            .query(query)
            .header(header::AUTHORIZATION, self.api_key.expose_secret())
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, "request"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| map_reqwest_error(e, "read body"))?;

        if !status.is_success() {
            let message: String = body.chars().take(200).collect();
            return Err(CatalogError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(body))
    }
}

#[async_trait]
impl CatalogSource for IsbnDbClient {
    fn name(&self) -> &str {
        "isbndb"
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: usize,
    ) -> CatalogResult<Vec<ExternalBook>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/books/{}", self.base_url, urlencoding::encode(query));
        tracing::debug!(%url, page, page_size, "catalog search");

        let params = [
            ("page", page.max(1).to_string()),
            ("pageSize", page_size.to_string()),
        ];
        let Some(body) = self.get(&url, &params).await? else {
            // The API answers 404 when nothing matches
            return Ok(Vec::new());
        };

        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;

        let mut books = response.books;
        books.truncate(page_size);
        Ok(books)
    }

    async fn fetch_by_isbn(&self, isbn: &str) -> CatalogResult<Option<ExternalBook>> {
        let Some(isbn) = normalize_isbn(isbn) else {
            return Ok(None);
        };

        let url = format!("{}/book/{}", self.base_url, urlencoding::encode(&isbn));
        tracing::debug!(%url, "catalog lookup");

        let Some(body) = self.get(&url, &[]).await? else {
            return Ok(None);
        };

        let response: BookResponse =
            serde_json::from_str(&body).map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(Some(response.book))
    }
}
