//! Review service

use std::sync::Arc;

use super::events::{Event, EventBus};
use super::validation::ValidationService;
use crate::error::{LuminaError, Result};
use crate::store::{ReviewStore, SessionStore};
use crate::types::{now_millis, Review};
use crate::Database;

/// A review as submitted by the signed-in user
#[derive(Debug, Clone)]
pub struct NewReview {
    pub book_id: String,
    pub rating: f64,
    pub title: String,
    pub text: String,
    pub contains_spoilers: bool,
}

#[derive(Clone)]
pub struct ReviewService {
    db: Arc<Database>,
    reviews: ReviewStore,
    session: SessionStore,
    validation: ValidationService,
    event_bus: EventBus,
}

impl ReviewService {
    pub fn new(
        db: Arc<Database>,
        reviews: ReviewStore,
        session: SessionStore,
        validation: ValidationService,
        event_bus: EventBus,
    ) -> Self {
        Self {
            db,
            reviews,
            session,
            validation,
            event_bus,
        }
    }

    /// Publish a review under the signed-in user's name
    ///
    /// Reviews cannot be edited or deleted afterwards.
    pub async fn add_review(&self, request: NewReview) -> Result<Review> {
        let user = self.session.current().ok_or(LuminaError::NotAuthenticated)?;

        self.validation
            .validate_review(&request.title, &request.text, request.rating)
            .into_result()?;

        let book_id = request.book_id.trim();
        if book_id.is_empty() {
            return Err(LuminaError::InvalidInput(
                "Review must name a book".to_string(),
            ));
        }

        let review = Review {
            id: uuid::Uuid::new_v4().to_string(),
            book_id: book_id.to_string(),
            user_id: user.id,
            user_name: user.display_name,
            rating: request.rating,
            title: request.title.trim().to_string(),
            text: request.text.trim().to_string(),
            contains_spoilers: request.contains_spoilers,
            likes: 0,
            comments_count: 0,
            created_at: now_millis(),
        };

        self.db.insert_review(&review).await?;
        self.reviews.insert(review.clone());

        tracing::info!(review_id = %review.id, book_id = %review.book_id, "review added");
        self.event_bus.emit(Event::ReviewAdded {
            review_id: review.id.clone(),
            book_id: review.book_id.clone(),
        });
        Ok(review)
    }

    /// Reviews of a book, oldest first, with current comment counts
    pub async fn list_for_book(&self, book_id: &str) -> Result<Vec<Review>> {
        let reviews = self.db.list_reviews_for_book(book_id).await?;
        self.reviews.replace_for_book(book_id, reviews.clone());
        Ok(reviews)
    }

    pub async fn get(&self, review_id: &str) -> Result<Option<Review>> {
        let review = self.db.get_review(review_id).await?;
        if let Some(review) = &review {
            self.reviews.insert(review.clone());
        }
        Ok(review)
    }

    /// Reviews cached by earlier calls
    pub fn cached_for_book(&self, book_id: &str) -> Vec<Review> {
        self.reviews.for_book(book_id)
    }
}
