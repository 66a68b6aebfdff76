//! Database operations for Lumina
//!
//! The SQLite database plays the role of the remote document store: shelf
//! documents, user profiles, accounts, reviews and comments all live here.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;

use crate::error::{DbError, Result};
use crate::types::{clamp_rating, now_millis, Book, Comment, Review, ShelfStatus, User};

/// Book fields embedded in a shelf document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookData {
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub pages: u32,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub description: String,
    pub rating: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Book> for BookData {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            cover_url: book.cover_url.clone(),
            pages: book.pages,
            isbn: book.isbn.clone(),
            publisher: book.publisher.clone(),
            published_date: book.published_date.clone(),
            description: book.description.clone(),
            rating: book.rating,
            tags: book.tags.iter().cloned().collect(),
        }
    }
}

/// A user's shelf entry for one book
#[derive(Debug, Clone, PartialEq)]
pub struct ShelfDocument {
    pub id: String,
    pub user_id: String,
    pub book_id: String,
    pub status: ShelfStatus,
    pub current_page: u32,
    /// Epoch milliseconds
    pub added_at: i64,
    /// Epoch milliseconds
    pub updated_at: i64,
    pub book_data: BookData,
}

impl ShelfDocument {
    /// Rebuild the shelf book this document describes
    pub fn to_book(&self) -> Book {
        let data = &self.book_data;
        let mut book = Book::new(
            self.book_id.clone(),
            data.title.clone(),
            data.author.clone(),
            data.pages,
        );
        book.status = self.status;
        book.current_page = book.clamp_progress(i64::from(self.current_page));
        book.rating = clamp_rating(data.rating);
        book.description = data.description.clone();
        book.tags = data.tags.iter().cloned().collect();
        book.cover_url = data.cover_url.clone();
        book.isbn = data.isbn.clone();
        book.publisher = data.publisher.clone();
        book.published_date = data.published_date.clone();
        book
    }
}

/// Public profile of a user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileDocument {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ProfileDocument {
    pub fn for_user(user: &User) -> Self {
        let now = now_millis();
        Self {
            id: user.id.clone(),
            display_name: user.display_name.clone(),
            email: user.email.clone(),
            photo_url: user.photo_url.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Stored credentials for a local account
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub user: User,
    pub password_salt: String,
    pub password_hash: String,
    pub created_at: i64,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database and run migrations
    pub async fn new(db_path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(DbError::IoError)?;
        }

        // mode=rwc creates the file if it doesn't exist
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DbError::MigrationError)?;

        tracing::debug!(path = %expanded_path, "database ready");
        Ok(Self { pool })
    }

    // ------------------------------------------------------------------
    // Shelf documents
    // ------------------------------------------------------------------

    /// Find the shelf document for `(user_id, book_id)`
    pub async fn find_shelf_document(
        &self,
        user_id: &str,
        book_id: &str,
    ) -> Result<Option<ShelfDocument>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, book_id, status, current_page, added_at, updated_at, book_data
            FROM shelf_documents
            WHERE user_id = ? AND book_id = ?
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        row.as_ref().map(row_to_shelf_document).transpose()
    }

    /// Write a shelf book for a user
    ///
    /// Queries by `(user_id, book_id)`: an existing document is merge-updated
    /// with the book's status, progress and metadata; otherwise a new document
    /// is inserted. Concurrent writers race, and the last write wins.
    pub async fn upsert_shelf_document(&self, user_id: &str, book: &Book) -> Result<ShelfDocument> {
        let now = now_millis();
        let book_data = BookData::from(book);
        let book_data_json = serde_json::to_string(&book_data).map_err(|e| {
            DbError::CorruptDocument {
                field: "book_data",
                reason: e.to_string(),
            }
        })?;

        if let Some(existing) = self.find_shelf_document(user_id, &book.id).await? {
            sqlx::query(
                r#"
                UPDATE shelf_documents
                SET status = ?, current_page = ?, updated_at = ?, book_data = ?
                WHERE id = ?
                "#,
            )
            .bind(book.status.as_str())
            .bind(i64::from(book.current_page))
            .bind(now)
            .bind(&book_data_json)
            .bind(&existing.id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

            return Ok(ShelfDocument {
                status: book.status,
                current_page: book.current_page,
                updated_at: now,
                book_data,
                ..existing
            });
        }

        let document = ShelfDocument {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            book_id: book.id.clone(),
            status: book.status,
            current_page: book.current_page,
            added_at: now,
            updated_at: now,
            book_data,
        };

        sqlx::query(
            r#"
            INSERT INTO shelf_documents
                (id, user_id, book_id, status, current_page, added_at, updated_at, book_data)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&document.id)
        .bind(&document.user_id)
        .bind(&document.book_id)
        .bind(document.status.as_str())
        .bind(i64::from(document.current_page))
        .bind(document.added_at)
        .bind(document.updated_at)
        .bind(&book_data_json)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(document)
    }

    /// All shelf documents of a user, oldest first
    pub async fn list_shelf_documents(&self, user_id: &str) -> Result<Vec<ShelfDocument>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, book_id, status, current_page, added_at, updated_at, book_data
            FROM shelf_documents
            WHERE user_id = ?
            ORDER BY added_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        rows.iter().map(row_to_shelf_document).collect()
    }

    /// Delete a user's shelf document; returns whether anything was removed
    pub async fn delete_shelf_document(&self, user_id: &str, book_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM shelf_documents WHERE user_id = ? AND book_id = ?")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileDocument>> {
        let row = sqlx::query(
            r#"
            SELECT id, display_name, email, photo_url, created_at, updated_at
            FROM user_profiles WHERE id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.map(|r| ProfileDocument {
            id: r.get("id"),
            display_name: r.get("display_name"),
            email: r.get("email"),
            photo_url: r.get("photo_url"),
            created_at: r.get("created_at"),
            updated_at: r.get("updated_at"),
        }))
    }

    /// Insert or replace a profile document
    pub async fn save_profile(&self, profile: &ProfileDocument) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, display_name, email, photo_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                email = excluded.email,
                photo_url = excluded.photo_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.display_name)
        .bind(&profile.email)
        .bind(&profile.photo_url)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Accounts
    // ------------------------------------------------------------------

    pub async fn create_account(&self, account: &AccountRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts
                (id, email, display_name, photo_url, password_salt, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.user.id)
        .bind(&account.user.email)
        .bind(&account.user.display_name)
        .bind(&account.user.photo_url)
        .bind(&account.password_salt)
        .bind(&account.password_hash)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Look an account up by (already normalized) email
    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<AccountRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, display_name, photo_url, password_salt, password_hash, created_at
            FROM accounts WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.map(|r| AccountRecord {
            user: User {
                id: r.get("id"),
                display_name: r.get("display_name"),
                email: r.get("email"),
                photo_url: r.get("photo_url"),
            },
            password_salt: r.get("password_salt"),
            password_hash: r.get("password_hash"),
            created_at: r.get("created_at"),
        }))
    }

    pub async fn update_account_profile(
        &self,
        user_id: &str,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<()> {
        sqlx::query("UPDATE accounts SET display_name = ?, photo_url = ? WHERE id = ?")
            .bind(display_name)
            .bind(photo_url)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    // ------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------

    pub async fn insert_review(&self, review: &Review) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reviews
                (id, book_id, user_id, user_name, rating, title, text, contains_spoilers, likes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&review.id)
        .bind(&review.book_id)
        .bind(&review.user_id)
        .bind(&review.user_name)
        .bind(review.rating)
        .bind(&review.title)
        .bind(&review.text)
        .bind(review.contains_spoilers)
        .bind(i64::from(review.likes))
        .bind(review.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// A review with its live comment count
    pub async fn get_review(&self, review_id: &str) -> Result<Option<Review>> {
        let row = sqlx::query(
            r#"
            SELECT r.id, r.book_id, r.user_id, r.user_name, r.rating, r.title, r.text,
                   r.contains_spoilers, r.likes, r.created_at,
                   (SELECT COUNT(*) FROM comments c WHERE c.review_id = r.id) AS comments_count
            FROM reviews r WHERE r.id = ?
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.as_ref().map(row_to_review))
    }

    /// Reviews of a book in insertion order, with live comment counts
    pub async fn list_reviews_for_book(&self, book_id: &str) -> Result<Vec<Review>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.book_id, r.user_id, r.user_name, r.rating, r.title, r.text,
                   r.contains_spoilers, r.likes, r.created_at,
                   (SELECT COUNT(*) FROM comments c WHERE c.review_id = r.id) AS comments_count
            FROM reviews r
            WHERE r.book_id = ?
            ORDER BY r.seq ASC
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(row_to_review).collect())
    }

    // ------------------------------------------------------------------
    // Comments
    // ------------------------------------------------------------------

    pub async fn insert_comment(&self, comment: &Comment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO comments
                (id, review_id, user_id, user_name, text, parent_comment_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.review_id)
        .bind(&comment.user_id)
        .bind(&comment.user_name)
        .bind(&comment.text)
        .bind(&comment.parent_comment_id)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    pub async fn get_comment(&self, comment_id: &str) -> Result<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, review_id, user_id, user_name, text, parent_comment_id, created_at
            FROM comments WHERE id = ?
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(row.as_ref().map(row_to_comment))
    }

    /// Comments of a review in insertion order
    pub async fn list_comments(&self, review_id: &str) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, review_id, user_id, user_name, text, parent_comment_id, created_at
            FROM comments
            WHERE review_id = ?
            ORDER BY seq ASC
            "#,
        )
        .bind(review_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(rows.iter().map(row_to_comment).collect())
    }
}

fn row_to_shelf_document(r: &SqliteRow) -> Result<ShelfDocument> {
    let status: String = r.get("status");
    let status = status.parse::<ShelfStatus>().map_err(|reason| DbError::CorruptDocument {
        field: "status",
        reason,
    })?;

    let book_data: String = r.get("book_data");
    let book_data: BookData =
        serde_json::from_str(&book_data).map_err(|e| DbError::CorruptDocument {
            field: "book_data",
            reason: e.to_string(),
        })?;

    let current_page: i64 = r.get("current_page");

    Ok(ShelfDocument {
        id: r.get("id"),
        user_id: r.get("user_id"),
        book_id: r.get("book_id"),
        status,
        current_page: u32::try_from(current_page.max(0)).unwrap_or(u32::MAX),
        added_at: r.get("added_at"),
        updated_at: r.get("updated_at"),
        book_data,
    })
}

fn row_to_review(r: &SqliteRow) -> Review {
    let likes: i64 = r.get("likes");
    let comments_count: i64 = r.get("comments_count");
    Review {
        id: r.get("id"),
        book_id: r.get("book_id"),
        user_id: r.get("user_id"),
        user_name: r.get("user_name"),
        rating: r.get("rating"),
        title: r.get("title"),
        text: r.get("text"),
        contains_spoilers: r.get("contains_spoilers"),
        likes: u32::try_from(likes.max(0)).unwrap_or(u32::MAX),
        comments_count: u32::try_from(comments_count.max(0)).unwrap_or(u32::MAX),
        created_at: r.get("created_at"),
    }
}

fn row_to_comment(r: &SqliteRow) -> Comment {
    Comment {
        id: r.get("id"),
        review_id: r.get("review_id"),
        user_id: r.get("user_id"),
        user_name: r.get("user_name"),
        text: r.get("text"),
        parent_comment_id: r.get("parent_comment_id"),
        created_at: r.get("created_at"),
    }
}
