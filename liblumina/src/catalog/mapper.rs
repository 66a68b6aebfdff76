//! Mapping from catalog API records into Lumina books

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

use crate::types::{slugify, Book};

pub const UNKNOWN_AUTHOR: &str = "Autor desconhecido";
pub const UNKNOWN_TITLE: &str = "Título desconhecido";
pub const MISSING_SYNOPSIS: &str = "Sem descrição disponível.";

/// One book as the metadata API returns it
///
/// Every field is optional; the API omits whatever it does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalBook {
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub isbn13: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub pages: Option<u32>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub subjects: Option<Vec<String>>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date_published: Option<String>,
}

/// Search endpoint payload
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub books: Vec<ExternalBook>,
}

/// Single-book endpoint payload
#[derive(Debug, Clone, Deserialize)]
pub struct BookResponse {
    pub book: ExternalBook,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Translate an API record into the internal `Book` shape
///
/// Books from the catalog always start on `want`, at page 0, unrated.
pub fn map_external_book(record: ExternalBook) -> Book {
    let isbn13 = non_blank(record.isbn13);
    let isbn10 = non_blank(record.isbn);
    let title = non_blank(record.title);

    let id = isbn13
        .clone()
        .or_else(|| isbn10.clone())
        .unwrap_or_else(|| slugify(title.as_deref().unwrap_or_default()));

    let authors: Vec<String> = record
        .authors
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    let author = if authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        authors.join(", ")
    };

    let tags: BTreeSet<String> = record
        .subjects
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let mut book = Book::new(
        id,
        title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        author,
        record.pages.unwrap_or(0),
    );
    book.description =
        non_blank(record.synopsis).unwrap_or_else(|| MISSING_SYNOPSIS.to_string());
    book.tags = tags;
    book.cover_url = non_blank(record.image);
    book.isbn = isbn13.or(isbn10);
    book.publisher = non_blank(record.publisher);
    book.published_date = non_blank(record.date_published);
    book
}

/// Accept page counts sent as numbers or numeric strings
fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Accept dates sent as strings or bare years
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
