//! Lumina - a reading tracker for the command line
//!
//! This library provides the data model, client-side stores and service layer
//! behind the Lumina tools: a personal shelf with reading status and progress,
//! an external book catalog, and reviews with threaded comments.

pub mod blob;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod local_state;
pub mod logging;
pub mod seed;
pub mod service;
pub mod store;
pub mod theme;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{LuminaError, Result};
pub use theme::{Palette, ThemePreference};
pub use types::{Book, Comment, Review, ShelfStatus, User};
