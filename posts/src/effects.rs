//! Store adapter: effects that carry session mutations to the post
//! aggregate service.
//!
//! Each function wraps one remote call and maps its outcome onto the
//! confirmation/failure event the reducer reconciles with. Failures are
//! carried as display strings - the reducer reverts state and surfaces
//! them as notices, it never inspects them structurally.

use crate::state::PostAction;
use daylog_client::{NewComment, NewPost, PostService, UpdatePost};
use daylog_core::effect::Effect;
use std::sync::Arc;

pub(crate) fn load_post(service: Arc<dyn PostService>, post_id: String) -> Effect<PostAction> {
    Effect::future(async move {
        match service.get_post(post_id).await {
            Ok(post) => Some(PostAction::PostLoaded { post }),
            Err(error) => {
                tracing::warn!(%error, "post load failed");
                Some(PostAction::PostLoadFailed {
                    error: error.to_string(),
                })
            },
        }
    })
}

/// The full-list replace. `update.content` is the canonical encoding of
/// the optimistically applied list; the echoed post is what the reducer
/// re-decodes on success.
pub(crate) fn persist_todos(
    service: Arc<dyn PostService>,
    post_id: String,
    update: UpdatePost,
) -> Effect<PostAction> {
    Effect::future(async move {
        match service.update_post(post_id, update).await {
            Ok(post) => Some(PostAction::TodosSaved { post }),
            Err(error) => {
                tracing::warn!(%error, "todo save failed");
                Some(PostAction::TodosSaveFailed {
                    error: error.to_string(),
                })
            },
        }
    })
}

pub(crate) fn toggle_like(service: Arc<dyn PostService>, post_id: String) -> Effect<PostAction> {
    Effect::future(async move {
        match service.toggle_like(post_id).await {
            Ok(response) => Some(PostAction::LikeConfirmed {
                liked: response.liked,
                like_count: response.like_count,
            }),
            Err(error) => {
                tracing::warn!(%error, "like toggle failed");
                Some(PostAction::LikeFailed {
                    error: error.to_string(),
                })
            },
        }
    })
}

pub(crate) fn create_post(service: Arc<dyn PostService>, new_post: NewPost) -> Effect<PostAction> {
    Effect::future(async move {
        match service.create_post(new_post).await {
            Ok(post) => Some(PostAction::PostCreated { post }),
            Err(error) => {
                tracing::warn!(%error, "post create failed");
                Some(PostAction::PostCreateFailed {
                    error: error.to_string(),
                })
            },
        }
    })
}

pub(crate) fn submit_comment(
    service: Arc<dyn PostService>,
    post_id: String,
    comment: NewComment,
) -> Effect<PostAction> {
    Effect::future(async move {
        match service.create_comment(post_id, comment).await {
            Ok(_) => Some(PostAction::CommentSubmitted),
            Err(error) => {
                tracing::warn!(%error, "comment submit failed");
                Some(PostAction::CommentSubmitFailed {
                    error: error.to_string(),
                })
            },
        }
    })
}

pub(crate) fn fetch_comments(service: Arc<dyn PostService>, post_id: String) -> Effect<PostAction> {
    Effect::future(async move {
        match service.list_comments(post_id).await {
            Ok(comments) => Some(PostAction::CommentsLoaded { comments }),
            Err(error) => {
                tracing::warn!(%error, "comment fetch failed");
                Some(PostAction::CommentsLoadFailed {
                    error: error.to_string(),
                })
            },
        }
    })
}

pub(crate) fn delete_comment(
    service: Arc<dyn PostService>,
    comment_id: String,
) -> Effect<PostAction> {
    Effect::future(async move {
        match service.delete_comment(comment_id).await {
            Ok(()) => Some(PostAction::CommentDeleted),
            Err(error) => {
                tracing::warn!(%error, "comment delete failed");
                Some(PostAction::CommentDeleteFailed {
                    error: error.to_string(),
                })
            },
        }
    })
}
