//! Change notifications for store mutations
//!
//! Every successful mutation made through the service layer emits an
//! [`Event`] on a `tokio::sync::broadcast` channel. Front ends subscribe to
//! refresh whatever they show; with no subscribers the event is dropped.
//!
//! # Example
//!
//! ```no_run
//! use liblumina::service::events::{Event, EventBus};
//! use liblumina::ShelfStatus;
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::ShelfUpdated {
//!     book_id: "dom-casmurro".to_string(),
//!     status: ShelfStatus::Reading,
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::theme::ThemePreference;
use crate::types::ShelfStatus;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Broadcast channel shared by all sub-services
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event without blocking
    ///
    /// Lagging subscribers lose the oldest events.
    pub fn emit(&self, event: Event) {
        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// What changed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A book was added to the shelf or its status changed
    ShelfUpdated { book_id: String, status: ShelfStatus },

    /// Reading progress was stored
    ProgressUpdated { book_id: String, current_page: u32 },

    BookRemoved { book_id: String },

    ReviewAdded { review_id: String, book_id: String },

    CommentAdded {
        comment_id: String,
        review_id: String,
        parent_comment_id: Option<String>,
    },

    /// Someone signed in (`user_id` set) or out (`None`)
    SessionChanged { user_id: Option<String> },

    ProfileUpdated { user_id: String },

    ThemeChanged { preference: ThemePreference },
}
