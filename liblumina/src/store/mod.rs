//! In-memory stores behind the service layer
//!
//! Each store is an explicit, cloneable container shared by the services that
//! need it. Clones share the same underlying data. Stores only guard their
//! contents for memory safety; they do not coordinate concurrent writers, and
//! the last write to an entity wins.
//!
//! - `BookStore`: the signed-in user's shelf
//! - `ReviewStore`: reviews grouped by book
//! - `CommentStore`: comments grouped by review
//! - `SessionStore` / `ThemeStore`: persisted local state

pub mod books;
pub mod comments;
pub mod reviews;
pub mod session;

pub use books::BookStore;
pub use comments::{CommentStore, CommentThread};
pub use reviews::ReviewStore;
pub use session::{SessionStore, ThemeStore};
