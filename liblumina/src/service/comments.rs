//! Comment service
//!
//! Comments form threads: a comment may reply to another comment on the same
//! review, to any depth.

use std::sync::Arc;

use super::events::{Event, EventBus};
use super::validation::ValidationService;
use crate::error::{LuminaError, Result};
use crate::store::{CommentStore, CommentThread, ReviewStore, SessionStore};
use crate::types::{now_millis, Comment};
use crate::Database;

#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    comments: CommentStore,
    reviews: ReviewStore,
    session: SessionStore,
    validation: ValidationService,
    event_bus: EventBus,
}

impl CommentService {
    pub fn new(
        db: Arc<Database>,
        comments: CommentStore,
        reviews: ReviewStore,
        session: SessionStore,
        validation: ValidationService,
        event_bus: EventBus,
    ) -> Self {
        Self {
            db,
            comments,
            reviews,
            session,
            validation,
            event_bus,
        }
    }

    /// All comments of a review in insertion order
    pub async fn list_comments(&self, review_id: &str) -> Result<Vec<Comment>> {
        let comments = self.db.list_comments(review_id).await?;
        self.comments.replace_for_review(review_id, comments.clone());
        Ok(comments)
    }

    /// Comments of a review arranged as a thread
    pub async fn thread(&self, review_id: &str) -> Result<CommentThread> {
        Ok(CommentThread::from_comments(
            self.list_comments(review_id).await?,
        ))
    }

    /// Comment on a review, or reply to `parent_id`
    ///
    /// The parent must be a comment of the same review.
    pub async fn add_comment(
        &self,
        review_id: &str,
        text: &str,
        parent_id: Option<&str>,
    ) -> Result<Comment> {
        let user = self.session.current().ok_or(LuminaError::NotAuthenticated)?;
        self.validation.validate_comment(text).into_result()?;

        if self.db.get_review(review_id).await?.is_none() {
            return Err(LuminaError::NotFound(format!("review '{}'", review_id)));
        }

        if let Some(parent_id) = parent_id {
            match self.db.get_comment(parent_id).await? {
                Some(parent) if parent.review_id == review_id => {}
                Some(_) => {
                    return Err(LuminaError::InvalidInput(format!(
                        "comment '{}' belongs to another review",
                        parent_id
                    )))
                }
                None => {
                    return Err(LuminaError::InvalidInput(format!(
                        "parent comment '{}' does not exist",
                        parent_id
                    )))
                }
            }
        }

        let comment = Comment {
            id: uuid::Uuid::new_v4().to_string(),
            review_id: review_id.to_string(),
            user_id: user.id,
            user_name: user.display_name,
            text: text.trim().to_string(),
            parent_comment_id: parent_id.map(str::to_string),
            created_at: now_millis(),
        };

        self.db.insert_comment(&comment).await?;
        self.comments.append(comment.clone());
        self.reviews.increment_comments(review_id);

        tracing::info!(
            comment_id = %comment.id,
            review_id,
            reply = comment.parent_comment_id.is_some(),
            "comment added"
        );
        self.event_bus.emit(Event::CommentAdded {
            comment_id: comment.id.clone(),
            review_id: comment.review_id.clone(),
            parent_comment_id: comment.parent_comment_id.clone(),
        });
        Ok(comment)
    }

    /// Number of cached comments for a review
    pub fn cached_count(&self, review_id: &str) -> usize {
        self.comments.count_for_review(review_id)
    }
}
