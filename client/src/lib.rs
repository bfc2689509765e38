//! # daylog Client
//!
//! Client for the post aggregate service - the external collaborator that
//! owns posts, likes, and comments. The sync core consumes it at its HTTP
//! contract boundary only: full post reads, full-content updates, an
//! idempotent like toggle, and the comment sub-resource.
//!
//! The [`PostService`] trait is dyn-compatible (boxed-future methods) so
//! reducers can capture an `Arc<dyn PostService>` inside effects. The
//! production implementation is [`HttpPostService`]; tests use the
//! in-memory implementation from `daylog-testing`.
//!
//! Authorization (author-only mutation, 401/403) is enforced entirely by
//! the remote service. This crate only maps those statuses onto error
//! variants.

pub mod error;
pub mod http;
pub mod service;
pub mod types;

pub use error::PostServiceError;
pub use http::HttpPostService;
pub use service::{PostService, ServiceFuture};
pub use types::{
    AuthorPayload, Category, CommentPayload, Counts, LikeEntry, LikeResponse, MediaType,
    NewComment, NewPost, PostPayload, UpdatePost,
};
