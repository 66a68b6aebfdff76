//! Comment store and thread view

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::Comment;

/// Comments grouped by review, each group in insertion order
#[derive(Debug, Clone, Default)]
pub struct CommentStore {
    by_review: Arc<RwLock<HashMap<String, Vec<Comment>>>>,
}

impl CommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, comment: Comment) {
        self.by_review
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(comment.review_id.clone())
            .or_default()
            .push(comment);
    }

    pub fn for_review(&self, review_id: &str) -> Vec<Comment> {
        self.by_review
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(review_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn replace_for_review(&self, review_id: &str, comments: Vec<Comment>) {
        self.by_review
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(review_id.to_string(), comments);
    }

    pub fn count_for_review(&self, review_id: &str) -> usize {
        self.by_review
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(review_id)
            .map_or(0, Vec::len)
    }
}

/// A review's comments split into top-level comments and replies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    /// Comments without a parent, in insertion order
    pub top_level: Vec<Comment>,
    /// Replies keyed by parent comment id, each group in insertion order
    pub replies: HashMap<String, Vec<Comment>>,
}

impl CommentThread {
    pub fn from_comments(comments: Vec<Comment>) -> Self {
        let mut thread = Self::default();
        for comment in comments {
            match comment.parent_comment_id.clone() {
                None => thread.top_level.push(comment),
                Some(parent) => thread.replies.entry(parent).or_default().push(comment),
            }
        }
        thread
    }

    /// Direct replies to `comment_id`
    pub fn replies_to(&self, comment_id: &str) -> &[Comment] {
        self.replies.get(comment_id).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.top_level.len() + self.replies.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
