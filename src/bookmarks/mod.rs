//! Bookmarks Module
//!
//! The one resource this service exposes: a bookmark with a title, URL,
//! rating and description, stored in the `bookmarks` table.
//!
//! # Layers
//!
//! - [`BookmarksService`] owns the CRUD contract against the store
//! - [`serialize_bookmark`] turns a stored row into what clients see,
//!   sanitizing the free-text fields
//! - the handlers validate payloads and map results to status codes
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookmarks::bookmarks;
//!
//! let app = Router::new()
//!     .nest("/bookmarks", bookmarks::routes())
//!     .with_state(app_state);
//!
//! // Or use the service directly
//! let service = bookmarks::BookmarksService::new(db.connection());
//! let all = service.list_all().await?;
//! ```

mod handler;
mod routes;
mod serialize;
mod service;

pub use handler::{EMPTY_PATCH_MESSAGE, REQUIRED_FIELDS, validate_new_bookmark, validate_patch};
pub use routes::routes;
pub use serialize::{SerializedBookmark, WireRating, serialize_bookmark};
pub use service::BookmarksService;
