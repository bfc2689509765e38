//! State and actions for the post-editing session.
//!
//! A session covers one post: its decoded todo list, the current user's
//! like, and the comment thread. The session is materialized from a post
//! payload on load and persisted only through full-content updates.

use chrono::{DateTime, Utc};
use daylog_client::{Category, CommentPayload, MediaType, PostPayload};
use daylog_core::todo::{self, TodoItem};

/// The current principal, threaded explicitly into every mutation.
///
/// `None` means no authenticated user: mutations are refused locally
/// before any request is made. This is a usability hint - the service
/// enforces authorization on its side regardless.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    /// Authenticated user id, if any
    pub user_id: Option<String>,
}

impl Session {
    /// Session for an authenticated user
    #[must_use]
    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    /// Session with no authenticated user
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// Whether this session's user authored the given post
    #[must_use]
    pub fn is_author(&self, post: &PostSnapshot) -> bool {
        self.user_id.as_deref() == Some(post.author_id.as_str())
    }
}

/// The loaded post, minus the fields the session owns in decoded form.
///
/// `content` is deliberately absent: once loaded it lives only as the
/// decoded todo list on [`PostSession`], and is re-encoded on every save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostSnapshot {
    /// Post identifier
    pub id: String,
    /// Post title
    pub title: String,
    /// Grouping tag
    pub category: Option<Category>,
    /// Attached media location
    pub media_url: Option<String>,
    /// Attached media kind
    pub media_type: Option<MediaType>,
    /// Owning author's user id
    pub author_id: String,
    /// Author display name
    pub author_nickname: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<&PostPayload> for PostSnapshot {
    fn from(post: &PostPayload) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            category: post.category,
            media_url: post.media_url.clone(),
            media_type: post.media_type,
            author_id: post.author_id.clone(),
            author_nickname: post.author.nickname.clone(),
            created_at: post.created_at,
        }
    }
}

/// State of one post-editing session
///
/// Until a post is loaded (or created), `post` is `None` and todo
/// mutations are purely local - there is nothing to persist to yet.
#[derive(Clone, Debug, Default)]
pub struct PostSession {
    /// The loaded post, if any
    pub post: Option<PostSnapshot>,
    /// Decoded todo list, in display order
    pub todos: Vec<TodoItem>,
    /// Whether the current user likes this post
    pub liked: bool,
    /// Like count shown to the user
    pub like_count: u32,
    /// Comment count shown to the user (including replies)
    pub comment_count: u32,
    /// Loaded comment thread (one level of replies)
    pub comments: Vec<CommentPayload>,

    // In-flight gates: at most one outstanding mutation per resource.
    /// A post load is in flight
    pub loading: bool,
    /// A full-list todo replace is in flight
    pub saving: bool,
    /// A like toggle is in flight
    pub liking: bool,
    /// A comment create or delete is in flight
    pub submitting: bool,
    /// A post create is in flight
    pub creating: bool,
    /// A comment refetch is in flight
    pub comments_loading: bool,

    // Rollback snapshots, present only while the mutation is in flight.
    /// Todo list before the current save
    pub previous_todos: Option<Vec<TodoItem>>,
    /// `(liked, like_count)` before the current toggle
    pub previous_like: Option<(bool, u32)>,

    /// Last user-facing notice (validation refusal or mutation failure)
    pub last_notice: Option<String>,
}

impl PostSession {
    /// Creates a new empty session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any todo carries the given id
    #[must_use]
    pub fn has_todo(&self, id: &str) -> bool {
        self.todos.iter().any(|t| t.id == id)
    }

    /// Find a top-level comment or reply by id
    #[must_use]
    pub fn find_comment(&self, id: &str) -> Option<&CommentPayload> {
        self.comments.iter().find_map(|c| {
            if c.id == id {
                Some(c)
            } else {
                c.replies.iter().find(|r| r.id == id)
            }
        })
    }

    /// Populate the session from a freshly fetched post
    ///
    /// Decodes `content` into the todo list, derives `liked` from the
    /// post's like entries against the current session, and takes the
    /// aggregate counts.
    pub fn apply_post(&mut self, post: &PostPayload, session: &Session) {
        self.post = Some(PostSnapshot::from(post));
        self.todos = todo::decode(&post.content);
        self.liked = match &session.user_id {
            Some(user_id) => post.likes.iter().any(|l| &l.user_id == user_id),
            None => false,
        };
        self.like_count = post.counts.likes;
        self.comment_count = post.counts.comments;
        self.last_notice = None;
    }
}

/// Actions for the post-editing session
///
/// Commands carry user intent and are validated by the reducer; events
/// carry server confirmations and failures, fed back by effects.
#[derive(Clone, Debug)]
pub enum PostAction {
    // ========== Commands ==========
    /// Command: Load a post into the session
    LoadPost {
        /// Post to load
        post_id: String,
    },

    /// Command: Toggle the current user's like
    ToggleLike,

    /// Command: Append a todo with the given text
    AddTodo {
        /// Raw text, trimmed by the reducer
        text: String,
    },

    /// Command: Flip a todo's completed flag
    ToggleTodo {
        /// Todo to flip
        id: String,
    },

    /// Command: Remove a todo from the list
    RemoveTodo {
        /// Todo to remove
        id: String,
    },

    /// Command: Submit a comment (or reply)
    SubmitComment {
        /// Raw comment text, trimmed by the reducer
        text: String,
        /// Parent comment id when replying
        parent_id: Option<String>,
    },

    /// Command: Delete a comment
    DeleteComment {
        /// Comment to delete
        comment_id: String,
    },

    /// Command: Fetch the comment thread
    LoadComments,

    /// Command: Create a post from the locally drafted todo list
    CreatePost {
        /// Post title
        title: String,
        /// Grouping tag
        category: Category,
    },

    // ========== Events ==========
    /// Event: Post fetch succeeded
    PostLoaded {
        /// The fetched post
        post: PostPayload,
    },

    /// Event: Post fetch failed
    PostLoadFailed {
        /// User-facing failure message
        error: String,
    },

    /// Event: Like toggle confirmed by the server
    LikeConfirmed {
        /// Server-authoritative like state
        liked: bool,
        /// Authoritative count, when the server supplies one
        like_count: Option<u32>,
    },

    /// Event: Like toggle failed
    LikeFailed {
        /// User-facing failure message
        error: String,
    },

    /// Event: Full-list replace succeeded; carries the echoed post
    TodosSaved {
        /// The updated post as stored by the server
        post: PostPayload,
    },

    /// Event: Full-list replace failed
    TodosSaveFailed {
        /// User-facing failure message
        error: String,
    },

    /// Event: Comment accepted by the server
    CommentSubmitted,

    /// Event: Comment submission failed
    CommentSubmitFailed {
        /// User-facing failure message
        error: String,
    },

    /// Event: Comment thread fetched
    CommentsLoaded {
        /// The full thread
        comments: Vec<CommentPayload>,
    },

    /// Event: Comment thread fetch failed
    CommentsLoadFailed {
        /// User-facing failure message
        error: String,
    },

    /// Event: Comment deletion confirmed
    CommentDeleted,

    /// Event: Comment deletion failed
    CommentDeleteFailed {
        /// User-facing failure message
        error: String,
    },

    /// Event: Post creation confirmed; carries the created post
    PostCreated {
        /// The created post
        post: PostPayload,
    },

    /// Event: Post creation failed
    PostCreateFailed {
        /// User-facing failure message
        error: String,
    },
}
