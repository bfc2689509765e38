//! Post aggregate service abstraction.
//!
//! # Design
//!
//! The trait covers exactly the operations the sync core consumes:
//!
//! - Full post read (`GET /posts/{id}`)
//! - Full-content update (`PUT /posts/{id}`) - the todo store adapter's
//!   only write path
//! - Post creation (`POST /posts`)
//! - Idempotent like toggle (`POST /posts/{id}/like`, no body)
//! - Comment list/create/delete
//!
//! # Dyn Compatibility
//!
//! Methods return explicit `Pin<Box<dyn Future>>` instead of `async fn`
//! to enable trait object usage (`Arc<dyn PostService>`). This is required
//! for the effect system, where reducers create effects that capture the
//! service and outlive the reducer call.
//!
//! # Implementations
//!
//! - [`crate::HttpPostService`]: production implementation over reqwest
//! - `InMemoryPostService` (in `daylog-testing`): deterministic testing

use crate::error::PostServiceError;
use crate::types::{CommentPayload, LikeResponse, NewComment, NewPost, PostPayload, UpdatePost};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every service method.
pub type ServiceFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, PostServiceError>> + Send + 'a>>;

/// The post aggregate service contract.
///
/// Implementations must be `Send + Sync`; ids are passed owned so the
/// returned futures borrow nothing but the service itself.
pub trait PostService: Send + Sync {
    /// Fetch a full post, including content, counts, and like entries.
    ///
    /// # Errors
    ///
    /// [`PostServiceError::NotFound`] for unknown posts, plus the usual
    /// transport/parse failures.
    fn get_post(&self, post_id: String) -> ServiceFuture<'_, PostPayload>;

    /// Replace a post's title/content/media and get the updated post back.
    ///
    /// The echoed post is what callers re-decode to reconcile optimistic
    /// todo state with whatever the server actually stored.
    ///
    /// # Errors
    ///
    /// [`PostServiceError::Forbidden`] when the caller is not the author.
    fn update_post(&self, post_id: String, update: UpdatePost) -> ServiceFuture<'_, PostPayload>;

    /// Create a post from a drafted todo list.
    ///
    /// # Errors
    ///
    /// [`PostServiceError::Unauthorized`] without a session.
    fn create_post(&self, new_post: NewPost) -> ServiceFuture<'_, PostPayload>;

    /// Toggle the current user's like on a post.
    ///
    /// Idempotent and bodyless: the server decides like vs. unlike from
    /// its own state and reports the converged value.
    ///
    /// # Errors
    ///
    /// [`PostServiceError::Unauthorized`] without a session.
    fn toggle_like(&self, post_id: String) -> ServiceFuture<'_, LikeResponse>;

    /// List a post's comments as a one-level reply tree.
    ///
    /// # Errors
    ///
    /// Transport/parse failures; unknown posts yield an empty list on
    /// some deployments and `NotFound` on others - callers treat both as
    /// "nothing to show".
    fn list_comments(&self, post_id: String) -> ServiceFuture<'_, Vec<CommentPayload>>;

    /// Create a comment (or reply, via `parent_id`).
    ///
    /// # Errors
    ///
    /// [`PostServiceError::Unauthorized`] without a session.
    fn create_comment(
        &self,
        post_id: String,
        comment: NewComment,
    ) -> ServiceFuture<'_, CommentPayload>;

    /// Delete a comment. Allowed for the comment author and the post author.
    ///
    /// # Errors
    ///
    /// [`PostServiceError::Forbidden`] for anyone else.
    fn delete_comment(&self, comment_id: String) -> ServiceFuture<'_, ()>;
}
