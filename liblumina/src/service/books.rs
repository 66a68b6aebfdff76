//! Shelf service
//!
//! Mutations write through to the database first and then update the
//! in-memory `BookStore`, so the store never shows a change that was not
//! persisted. Every mutation needs a signed-in user.

use std::sync::Arc;

use super::events::{Event, EventBus};
use crate::error::{LuminaError, Result};
use crate::store::{BookStore, SessionStore};
use crate::types::{Book, ShelfStatus, User};
use crate::Database;

#[derive(Clone)]
pub struct BookService {
    db: Arc<Database>,
    books: BookStore,
    session: SessionStore,
    event_bus: EventBus,
}

impl BookService {
    pub fn new(
        db: Arc<Database>,
        books: BookStore,
        session: SessionStore,
        event_bus: EventBus,
    ) -> Self {
        Self {
            db,
            books,
            session,
            event_bus,
        }
    }

    fn require_user(&self) -> Result<User> {
        self.session.current().ok_or(LuminaError::NotAuthenticated)
    }

    /// Refresh the store from the signed-in user's shelf documents
    ///
    /// Without a session the shelf is simply empty.
    pub async fn load_shelf(&self) -> Result<Vec<Book>> {
        let Some(user) = self.session.current() else {
            self.books.replace_all(Vec::new());
            return Ok(Vec::new());
        };

        let books: Vec<Book> = self
            .db
            .list_shelf_documents(&user.id)
            .await?
            .iter()
            .map(|doc| doc.to_book())
            .collect();

        tracing::debug!(user_id = %user.id, count = books.len(), "shelf loaded");
        self.books.replace_all(books.clone());
        Ok(books)
    }

    /// The cached shelf
    pub fn shelf(&self) -> Vec<Book> {
        self.books.all()
    }

    pub fn shelf_by_status(&self, status: ShelfStatus) -> Vec<Book> {
        self.books.by_status(status)
    }

    /// A book on the signed-in user's shelf
    pub async fn get(&self, book_id: &str) -> Result<Option<Book>> {
        let user = self.require_user()?;
        self.find_shelf_book(&user, book_id).await
    }

    async fn find_shelf_book(&self, user: &User, book_id: &str) -> Result<Option<Book>> {
        if let Some(book) = self.books.get(book_id) {
            return Ok(Some(book));
        }
        let document = self.db.find_shelf_document(&user.id, book_id).await?;
        Ok(document.map(|doc| doc.to_book()))
    }

    async fn require_shelf_book(&self, user: &User, book_id: &str) -> Result<Book> {
        self.find_shelf_book(user, book_id)
            .await?
            .ok_or_else(|| LuminaError::NotFound(format!("'{}' is not on your shelf", book_id)))
    }

    /// Keep a book loaded from the database in the store
    fn cache(&self, book: Book) {
        if self.books.get(&book.id).is_none() {
            self.books.upsert(book);
        }
    }

    async fn persist(&self, user: &User, book: Book) -> Result<Book> {
        self.db.upsert_shelf_document(&user.id, &book).await?;
        self.books.upsert(book.clone());
        Ok(book)
    }

    /// Put a book on the shelf with `status`
    ///
    /// A book that is already shelved keeps its reading progress.
    pub async fn add_to_shelf(&self, mut book: Book, status: ShelfStatus) -> Result<Book> {
        let user = self.require_user()?;

        if let Some(existing) = self.find_shelf_book(&user, &book.id).await? {
            book.current_page = existing.current_page;
        }
        book.current_page = book.clamp_progress(i64::from(book.current_page));
        book.status = status;

        let book = self.persist(&user, book).await?;
        tracing::info!(book_id = %book.id, status = %status, "book shelved");
        self.event_bus.emit(Event::ShelfUpdated {
            book_id: book.id.clone(),
            status,
        });
        Ok(book)
    }

    /// Set a shelved book's status directly
    ///
    /// Progress is never reset. Setting the current status again rewrites the
    /// same document.
    pub async fn set_status(&self, book_id: &str, status: ShelfStatus) -> Result<Book> {
        let user = self.require_user()?;
        let book = self.require_shelf_book(&user, book_id).await?;

        let mut updated = book.clone();
        updated.status = status;
        self.db.upsert_shelf_document(&user.id, &updated).await?;

        self.cache(book);
        let book = self
            .books
            .set_status(book_id, status)
            .ok_or_else(|| LuminaError::NotFound(format!("'{}' is not on your shelf", book_id)))?;
        tracing::info!(book_id = %book.id, status = %status, "status updated");
        self.event_bus.emit(Event::ShelfUpdated {
            book_id: book.id.clone(),
            status,
        });
        Ok(book)
    }

    /// Move a shelved book to the next status in the cycle
    pub async fn advance_status(&self, book_id: &str) -> Result<Book> {
        let user = self.require_user()?;
        let book = self.require_shelf_book(&user, book_id).await?;
        let next = ShelfStatus::advance(Some(book.status));
        self.set_status(book_id, next).await
    }

    /// Advance `book`, shelving it at `want` if it is not on the shelf yet
    pub async fn advance_book(&self, book: Book) -> Result<Book> {
        let user = self.require_user()?;
        let current = self
            .find_shelf_book(&user, &book.id)
            .await?
            .map(|shelved| shelved.status);

        match current {
            Some(status) => {
                self.set_status(&book.id, ShelfStatus::advance(Some(status)))
                    .await
            }
            None => self.add_to_shelf(book, ShelfStatus::advance(None)).await,
        }
    }

    /// Record reading progress
    ///
    /// The page is clamped to the book's page count. A negative page changes
    /// nothing and returns `Ok(None)`. Status is left alone.
    pub async fn set_progress(&self, book_id: &str, page: i64) -> Result<Option<Book>> {
        let user = self.require_user()?;
        if page < 0 {
            tracing::debug!(book_id, page, "ignoring negative page");
            return Ok(None);
        }

        let book = self.require_shelf_book(&user, book_id).await?;

        let mut updated = book.clone();
        updated.apply_progress(page);
        self.db.upsert_shelf_document(&user.id, &updated).await?;

        self.cache(book);
        let Some(book) = self.books.set_progress(book_id, page) else {
            return Ok(None);
        };
        tracing::info!(book_id = %book.id, current_page = book.current_page, "progress updated");
        self.event_bus.emit(Event::ProgressUpdated {
            book_id: book.id.clone(),
            current_page: book.current_page,
        });
        Ok(Some(book))
    }

    /// Take a book off the shelf; returns whether it was there
    pub async fn remove_from_shelf(&self, book_id: &str) -> Result<bool> {
        let user = self.require_user()?;

        let removed = self.db.delete_shelf_document(&user.id, book_id).await?;
        let cached = self.books.remove(book_id).is_some();

        if removed || cached {
            tracing::info!(book_id, "book removed from shelf");
            self.event_bus.emit(Event::BookRemoved {
                book_id: book_id.to_string(),
            });
        }
        Ok(removed || cached)
    }
}
