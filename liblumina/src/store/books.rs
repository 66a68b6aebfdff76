//! Shelf store

use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{Book, ShelfStatus};

/// The user's shelf, in the order books were added
#[derive(Debug, Clone, Default)]
pub struct BookStore {
    books: Arc<RwLock<Vec<Book>>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole shelf, e.g. after loading it from the database
    pub fn replace_all(&self, books: Vec<Book>) {
        *self.books.write().unwrap_or_else(PoisonError::into_inner) = books;
    }

    /// Insert a book, or replace the entry with the same id in place
    pub fn upsert(&self, book: Book) {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        match books.iter_mut().find(|b| b.id == book.id) {
            Some(existing) => *existing = book,
            None => books.push(book),
        }
    }

    pub fn get(&self, id: &str) -> Option<Book> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|b| b.id == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Book> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn by_status(&self, status: ShelfStatus) -> Vec<Book> {
        self.books
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|b| b.status == status)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.books.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a book, returning it if it was on the shelf
    pub fn remove(&self, id: &str) -> Option<Book> {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let index = books.iter().position(|b| b.id == id)?;
        Some(books.remove(index))
    }

    /// Set a book's status, leaving its progress untouched
    pub fn set_status(&self, id: &str, status: ShelfStatus) -> Option<Book> {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let book = books.iter_mut().find(|b| b.id == id)?;
        book.status = status;
        Some(book.clone())
    }

    /// Store a clamped progress value
    ///
    /// Returns `None` when the book is unknown or `page` is negative; in both
    /// cases nothing changes.
    pub fn set_progress(&self, id: &str, page: i64) -> Option<Book> {
        let mut books = self.books.write().unwrap_or_else(PoisonError::into_inner);
        let book = books.iter_mut().find(|b| b.id == id)?;
        book.apply_progress(page)?;
        Some(book.clone())
    }
}
