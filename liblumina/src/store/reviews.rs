//! Review store

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::Review;

/// Reviews grouped by book, each group in insertion order
#[derive(Debug, Clone, Default)]
pub struct ReviewStore {
    by_book: Arc<RwLock<HashMap<String, Vec<Review>>>>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a review to its book's list
    ///
    /// Reviews are immutable; inserting an id that is already present
    /// replaces the cached copy instead of duplicating it.
    pub fn insert(&self, review: Review) {
        let mut by_book = self.by_book.write().unwrap_or_else(PoisonError::into_inner);
        let reviews = by_book.entry(review.book_id.clone()).or_default();
        match reviews.iter_mut().find(|r| r.id == review.id) {
            Some(existing) => *existing = review,
            None => reviews.push(review),
        }
    }

    pub fn for_book(&self, book_id: &str) -> Vec<Review> {
        self.by_book
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(book_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, review_id: &str) -> Option<Review> {
        self.by_book
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .flatten()
            .find(|r| r.id == review_id)
            .cloned()
    }

    /// Bump the cached comment count of a review
    ///
    /// Returns false when the review is not cached.
    pub fn increment_comments(&self, review_id: &str) -> bool {
        let mut by_book = self.by_book.write().unwrap_or_else(PoisonError::into_inner);
        match by_book.values_mut().flatten().find(|r| r.id == review_id) {
            Some(review) => {
                review.comments_count += 1;
                true
            }
            None => false,
        }
    }

    pub fn replace_for_book(&self, book_id: &str, reviews: Vec<Review>) {
        self.by_book
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(book_id.to_string(), reviews);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, book_id: &str) -> Review {
        Review {
            id: id.to_string(),
            book_id: book_id.to_string(),
            user_id: "user-1".to_string(),
            user_name: "Ana".to_string(),
            rating: 4.0,
            title: "Bom".to_string(),
            text: "Gostei.".to_string(),
            contains_spoilers: false,
            likes: 0,
            comments_count: 0,
            created_at: 0,
        }
    }

    #[test]
    fn test_reviews_grouped_by_book() {
        let store = ReviewStore::new();
        store.insert(review("r1", "book-a"));
        store.insert(review("r2", "book-a"));
        store.insert(review("r3", "book-b"));

        let ids: Vec<_> = store.for_book("book-a").into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(store.get("r3").unwrap().book_id, "book-b");
        assert!(store.for_book("book-c").is_empty());
    }

    #[test]
    fn test_insert_same_id_does_not_duplicate() {
        let store = ReviewStore::new();
        store.insert(review("r1", "book-a"));
        let mut again = review("r1", "book-a");
        again.comments_count = 3;
        store.insert(again);

        let reviews = store.for_book("book-a");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].comments_count, 3);
    }

    #[test]
    fn test_increment_comments() {
        let store = ReviewStore::new();
        store.insert(review("r1", "book-a"));

        assert!(store.increment_comments("r1"));
        assert!(store.increment_comments("r1"));
        assert_eq!(store.for_book("book-a")[0].comments_count, 2);
        assert!(!store.increment_comments("missing"));
    }

    #[test]
    fn test_replace_for_book() {
        let store = ReviewStore::new();
        store.insert(review("r1", "book-a"));
        store.replace_for_book("book-a", vec![review("r9", "book-a")]);
        assert!(store.get("r1").is_none());
        assert!(store.get("r9").is_some());
    }
}
