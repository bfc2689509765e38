//! In-memory post aggregate service for tests
//!
//! Deterministic [`PostService`] implementation backed by a mutex-held
//! map, with per-operation failure injection. The service records every
//! update request it receives so tests can assert on the exact payload a
//! full-list replace produced.

use chrono::{DateTime, Utc};
use daylog_client::{
    AuthorPayload, CommentPayload, Counts, LikeResponse, NewComment, NewPost, PostPayload,
    PostService, PostServiceError, ServiceFuture, UpdatePost,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Which operations should fail, and how.
#[derive(Clone, Debug, Default)]
struct FailureInjection {
    get_post: Option<String>,
    update_post: Option<String>,
    toggle_like: Option<String>,
    create_comment: Option<String>,
    list_comments: Option<String>,
    delete_comment: Option<String>,
    /// Fail the next `update_post` with 403 instead of a transport error.
    forbid_update: bool,
}

#[derive(Debug, Default)]
struct Inner {
    posts: HashMap<String, PostPayload>,
    comments: HashMap<String, Vec<CommentPayload>>,
    /// Per-post like flag for the (single) test user.
    liked: HashMap<String, bool>,
    failures: FailureInjection,
    recorded_updates: Vec<(String, UpdatePost)>,
    next_id: u64,
    /// When false, `toggle_like` omits `likeCount` from its response.
    report_like_count: bool,
}

/// In-memory post aggregate service with failure injection
///
/// # Example
///
/// ```ignore
/// let service = InMemoryPostService::new();
/// service.insert_post(post_with_content("p1", "[]"));
/// service.fail_update_post("database down");
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryPostService {
    inner: Arc<Mutex<Inner>>,
}

impl Default for InMemoryPostService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPostService {
    /// Create an empty service
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                report_like_count: true,
                ..Inner::default()
            })),
        }
    }

    #[allow(clippy::expect_used)] // Test infrastructure; a poisoned lock means a test already failed
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("post service mutex poisoned")
    }

    /// Seed a post
    pub fn insert_post(&self, post: PostPayload) {
        self.lock().posts.insert(post.id.clone(), post);
    }

    /// Read back a stored post (as the next `get_post` would return it)
    #[must_use]
    pub fn stored_post(&self, post_id: &str) -> Option<PostPayload> {
        self.lock().posts.get(post_id).cloned()
    }

    /// Every `(post_id, update)` pair received so far, in order
    #[must_use]
    pub fn recorded_updates(&self) -> Vec<(String, UpdatePost)> {
        self.lock().recorded_updates.clone()
    }

    /// Make subsequent `get_post` calls fail with a transport error
    pub fn fail_get_post(&self, message: &str) {
        self.lock().failures.get_post = Some(message.to_string());
    }

    /// Make subsequent `update_post` calls fail with a transport error
    pub fn fail_update_post(&self, message: &str) {
        self.lock().failures.update_post = Some(message.to_string());
    }

    /// Make subsequent `update_post` calls fail with 403 Forbidden
    pub fn forbid_update_post(&self) {
        self.lock().failures.forbid_update = true;
    }

    /// Make subsequent `toggle_like` calls fail with a transport error
    pub fn fail_toggle_like(&self, message: &str) {
        self.lock().failures.toggle_like = Some(message.to_string());
    }

    /// Make subsequent `create_comment` calls fail with a transport error
    pub fn fail_create_comment(&self, message: &str) {
        self.lock().failures.create_comment = Some(message.to_string());
    }

    /// Make subsequent `list_comments` calls fail with a transport error
    pub fn fail_list_comments(&self, message: &str) {
        self.lock().failures.list_comments = Some(message.to_string());
    }

    /// Make subsequent `delete_comment` calls fail with a transport error
    pub fn fail_delete_comment(&self, message: &str) {
        self.lock().failures.delete_comment = Some(message.to_string());
    }

    /// Clear all injected failures
    pub fn heal(&self) {
        self.lock().failures = FailureInjection::default();
    }

    /// Control whether the like toggle reports an authoritative count
    pub fn set_report_like_count(&self, report: bool) {
        self.lock().report_like_count = report;
    }

    /// Rewrite a stored post's content out-of-band, simulating another
    /// writer winning a concurrent full-list replace.
    pub fn overwrite_content(&self, post_id: &str, content: &str) {
        if let Some(post) = self.lock().posts.get_mut(post_id) {
            post.content = content.to_string();
        }
    }

    fn fresh_id(inner: &mut Inner, prefix: &str) -> String {
        inner.next_id += 1;
        format!("{prefix}-{}", inner.next_id)
    }

    fn timestamp() -> DateTime<Utc> {
        Utc::now()
    }
}

fn transport(message: &str) -> PostServiceError {
    PostServiceError::RequestFailed(message.to_string())
}

impl PostService for InMemoryPostService {
    fn get_post(&self, post_id: String) -> ServiceFuture<'_, PostPayload> {
        let this = self.clone();
        Box::pin(async move {
            let inner = this.lock();
            if let Some(message) = &inner.failures.get_post {
                return Err(transport(message));
            }
            inner
                .posts
                .get(&post_id)
                .cloned()
                .ok_or(PostServiceError::NotFound)
        })
    }

    fn update_post(&self, post_id: String, update: UpdatePost) -> ServiceFuture<'_, PostPayload> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.lock();
            inner
                .recorded_updates
                .push((post_id.clone(), update.clone()));

            if inner.failures.forbid_update {
                return Err(PostServiceError::Forbidden);
            }
            if let Some(message) = inner.failures.update_post.clone() {
                return Err(transport(&message));
            }

            let post = inner
                .posts
                .get_mut(&post_id)
                .ok_or(PostServiceError::NotFound)?;
            post.title = update.title;
            post.content = update.content;
            post.media_url = update.media_url;
            post.media_type = update.media_type;
            Ok(post.clone())
        })
    }

    fn create_post(&self, new_post: NewPost) -> ServiceFuture<'_, PostPayload> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.lock();
            let id = Self::fresh_id(&mut inner, "post");
            let post = PostPayload {
                id: id.clone(),
                title: new_post.title,
                content: new_post.content,
                category: Some(new_post.category),
                date: new_post.date,
                media_url: new_post.media_url,
                media_type: new_post.media_type,
                author_id: "test-user".to_string(),
                created_at: Self::timestamp(),
                author: AuthorPayload {
                    nickname: "tester".to_string(),
                },
                likes: Vec::new(),
                counts: Counts::default(),
            };
            inner.posts.insert(id, post.clone());
            Ok(post)
        })
    }

    fn toggle_like(&self, post_id: String) -> ServiceFuture<'_, LikeResponse> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.lock();
            if let Some(message) = inner.failures.toggle_like.clone() {
                return Err(transport(&message));
            }
            if !inner.posts.contains_key(&post_id) {
                return Err(PostServiceError::NotFound);
            }

            let liked = !inner.liked.get(&post_id).copied().unwrap_or(false);
            inner.liked.insert(post_id.clone(), liked);

            let report = inner.report_like_count;
            let like_count = {
                let post = inner
                    .posts
                    .get_mut(&post_id)
                    .ok_or(PostServiceError::NotFound)?;
                if liked {
                    post.counts.likes += 1;
                } else {
                    post.counts.likes = post.counts.likes.saturating_sub(1);
                }
                post.counts.likes
            };

            Ok(LikeResponse {
                liked,
                like_count: report.then_some(like_count),
            })
        })
    }

    fn list_comments(&self, post_id: String) -> ServiceFuture<'_, Vec<CommentPayload>> {
        let this = self.clone();
        Box::pin(async move {
            let inner = this.lock();
            if let Some(message) = &inner.failures.list_comments {
                return Err(transport(message));
            }
            Ok(inner.comments.get(&post_id).cloned().unwrap_or_default())
        })
    }

    fn create_comment(
        &self,
        post_id: String,
        comment: NewComment,
    ) -> ServiceFuture<'_, CommentPayload> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.lock();
            if let Some(message) = inner.failures.create_comment.clone() {
                return Err(transport(&message));
            }
            if !inner.posts.contains_key(&post_id) {
                return Err(PostServiceError::NotFound);
            }

            let id = Self::fresh_id(&mut inner, "comment");
            let payload = CommentPayload {
                id,
                content: comment.content,
                created_at: Self::timestamp(),
                author_id: "test-user".to_string(),
                parent_id: comment.parent_id.clone(),
                author: AuthorPayload {
                    nickname: "tester".to_string(),
                },
                replies: Vec::new(),
            };

            match comment.parent_id {
                Some(parent_id) => {
                    let thread = inner.comments.entry(post_id.clone()).or_default();
                    if let Some(parent) = thread.iter_mut().find(|c| c.id == parent_id) {
                        parent.replies.push(payload.clone());
                    }
                },
                None => {
                    inner
                        .comments
                        .entry(post_id.clone())
                        .or_default()
                        .push(payload.clone());
                },
            }

            if let Some(post) = inner.posts.get_mut(&post_id) {
                post.counts.comments += 1;
            }

            Ok(payload)
        })
    }

    fn delete_comment(&self, comment_id: String) -> ServiceFuture<'_, ()> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.lock();
            if let Some(message) = inner.failures.delete_comment.clone() {
                return Err(transport(&message));
            }

            let mut owning_post = None;
            for (post_id, thread) in &mut inner.comments {
                let before: usize = thread.iter().map(|c| 1 + c.replies.len()).sum();
                thread.retain(|c| c.id != comment_id);
                for comment in thread.iter_mut() {
                    comment.replies.retain(|r| r.id != comment_id);
                }
                let after: usize = thread.iter().map(|c| 1 + c.replies.len()).sum();
                if after < before {
                    owning_post = Some(post_id.clone());
                    break;
                }
            }

            let Some(post_id) = owning_post else {
                return Err(PostServiceError::NotFound);
            };

            if let Some(post) = inner.posts.get_mut(&post_id) {
                post.counts.comments = post.counts.comments.saturating_sub(1);
            }

            Ok(())
        })
    }
}
