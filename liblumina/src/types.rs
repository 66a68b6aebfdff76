//! Core types for Lumina

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Where a book sits on the user's shelf
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShelfStatus {
    #[default]
    Want,
    Reading,
    Read,
}

impl ShelfStatus {
    pub const ALL: [ShelfStatus; 3] = [ShelfStatus::Want, ShelfStatus::Reading, ShelfStatus::Read];

    /// Next status in the shelf cycle `want -> reading -> read -> want`
    ///
    /// A book without a status enters the cycle at `want`.
    pub fn advance(current: Option<ShelfStatus>) -> ShelfStatus {
        match current {
            None => ShelfStatus::Want,
            Some(ShelfStatus::Want) => ShelfStatus::Reading,
            Some(ShelfStatus::Reading) => ShelfStatus::Read,
            Some(ShelfStatus::Read) => ShelfStatus::Want,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShelfStatus::Want => "want",
            ShelfStatus::Reading => "reading",
            ShelfStatus::Read => "read",
        }
    }

    /// Human label used by the command-line tools
    pub fn label(&self) -> &'static str {
        match self {
            ShelfStatus::Want => "Want to read",
            ShelfStatus::Reading => "Reading",
            ShelfStatus::Read => "Read",
        }
    }
}

impl FromStr for ShelfStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "want" => Ok(ShelfStatus::Want),
            "reading" => Ok(ShelfStatus::Reading),
            "read" => Ok(ShelfStatus::Read),
            _ => Err(format!(
                "Invalid status: '{}'. Valid options: want, reading, read",
                s
            )),
        }
    }
}

impl std::fmt::Display for ShelfStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Clamp a page number to what a book can hold.
///
/// Books with an unknown page count (`pages == 0`) accept any non-negative
/// value.
pub fn clamp_progress(pages: u32, page: i64) -> u32 {
    let page = page.max(0);
    let page = u32::try_from(page).unwrap_or(u32::MAX);
    if pages > 0 {
        page.min(pages)
    } else {
        page
    }
}

/// Clamp a rating into `[0, 5]`; NaN becomes 0
pub fn clamp_rating(rating: f64) -> f64 {
    if rating.is_nan() {
        return 0.0;
    }
    rating.clamp(0.0, 5.0)
}

/// URL-friendly identifier derived from a title
///
/// `"O Pequeno Príncipe!"` becomes `"o-pequeno-príncipe"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub pages: u32,
    pub current_page: u32,
    pub status: ShelfStatus,
    pub rating: f64,
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
}

impl Book {
    /// A fresh book with catalog defaults: `want`, page 0, rating 0
    pub fn new(id: String, title: String, author: String, pages: u32) -> Self {
        Self {
            id,
            title,
            author,
            pages,
            current_page: 0,
            status: ShelfStatus::Want,
            rating: 0.0,
            description: String::new(),
            tags: BTreeSet::new(),
            cover_url: None,
            isbn: None,
            publisher: None,
            published_date: None,
        }
    }

    /// Clamp `page` against this book's page count
    pub fn clamp_progress(&self, page: i64) -> u32 {
        clamp_progress(self.pages, page)
    }

    /// Apply a progress update, returning the stored page
    ///
    /// Negative pages are rejected and leave the book untouched.
    pub fn apply_progress(&mut self, page: i64) -> Option<u32> {
        if page < 0 {
            return None;
        }
        self.current_page = self.clamp_progress(page);
        Some(self.current_page)
    }

    /// Reading progress in percent, if the page count is known
    pub fn progress_percent(&self) -> Option<u8> {
        if self.pages == 0 {
            return None;
        }
        let percent = (u64::from(self.current_page) * 100) / u64::from(self.pages);
        Some(percent.min(100) as u8)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: String,
    pub book_id: String,
    pub user_id: String,
    pub user_name: String,
    pub rating: f64,
    pub title: String,
    pub text: String,
    pub contains_spoilers: bool,
    pub likes: u32,
    /// Number of comments on this review, computed from the comment records
    pub comments_count: u32,
    /// Epoch milliseconds
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: String,
    pub review_id: String,
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    /// `None` for top-level comments
    pub parent_comment_id: Option<String>,
    /// Epoch milliseconds
    pub created_at: i64,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.parent_comment_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_status_cycle() {
        assert_eq!(ShelfStatus::advance(None), ShelfStatus::Want);
        assert_eq!(ShelfStatus::advance(Some(ShelfStatus::Want)), ShelfStatus::Reading);
        assert_eq!(ShelfStatus::advance(Some(ShelfStatus::Reading)), ShelfStatus::Read);
        assert_eq!(ShelfStatus::advance(Some(ShelfStatus::Read)), ShelfStatus::Want);
    }

    #[test]
    fn test_status_parse_and_display() {
        for status in ShelfStatus::ALL {
            assert_eq!(status.to_string().parse::<ShelfStatus>().unwrap(), status);
        }
        assert_eq!(" Reading ".parse::<ShelfStatus>().unwrap(), ShelfStatus::Reading);
        assert!("finished".parse::<ShelfStatus>().is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&ShelfStatus::Reading).unwrap();
        assert_eq!(json, "\"reading\"");
    }

    #[test]
    fn test_clamp_progress_known_pages() {
        for page in [-10, 0, 1, 150, 300, 301, 10_000] {
            let clamped = clamp_progress(300, page);
            assert!(clamped <= 300, "page {} clamped to {}", page, clamped);
        }
        assert_eq!(clamp_progress(300, 450), 300);
        assert_eq!(clamp_progress(300, -5), 0);
        assert_eq!(clamp_progress(300, 120), 120);
    }

    #[test]
    fn test_clamp_progress_unknown_pages() {
        assert_eq!(clamp_progress(0, 450), 450);
        assert_eq!(clamp_progress(0, -3), 0);
        assert_eq!(clamp_progress(0, 0), 0);
    }

    #[test]
    fn test_apply_progress_rejects_negative() {
        let mut book = Book::new("b1".into(), "Title".into(), "Author".into(), 300);
        book.current_page = 100;

        assert_eq!(book.apply_progress(450), Some(300));
        assert_eq!(book.current_page, 300);

        assert_eq!(book.apply_progress(-5), None);
        assert_eq!(book.current_page, 300);
    }

    #[test]
    fn test_apply_progress_does_not_touch_status() {
        let mut book = Book::new("b1".into(), "Title".into(), "Author".into(), 100);
        book.apply_progress(40);
        assert_eq!(book.status, ShelfStatus::Want);
    }

    #[test]
    fn test_progress_percent() {
        let mut book = Book::new("b1".into(), "Title".into(), "Author".into(), 200);
        book.current_page = 50;
        assert_eq!(book.progress_percent(), Some(25));

        book.pages = 0;
        assert_eq!(book.progress_percent(), None);
    }

    #[test]
    fn test_clamp_rating() {
        assert_eq!(clamp_rating(7.5), 5.0);
        assert_eq!(clamp_rating(-1.0), 0.0);
        assert_eq!(clamp_rating(3.5), 3.5);
        assert_eq!(clamp_rating(f64::NAN), 0.0);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Dom Casmurro"), "dom-casmurro");
        assert_eq!(slugify("  The  Lord of the Rings: Part I "), "the-lord-of-the-rings-part-i");
        assert_eq!(slugify("O Pequeno Príncipe!"), "o-pequeno-príncipe");
        assert_eq!(slugify("***"), "untitled");
        assert_eq!(slugify(""), "untitled");
    }

    #[test]
    fn test_comment_top_level() {
        let comment = Comment {
            id: "c1".into(),
            review_id: "r1".into(),
            user_id: "u1".into(),
            user_name: "Ana".into(),
            text: "Great review".into(),
            parent_comment_id: None,
            created_at: now_millis(),
        };
        assert!(comment.is_top_level());
    }
}
