//! Reducer logic for the post-editing session.
//!
//! All optimistic transitions and rollbacks happen here, synchronously.
//! Commands are validated, applied to local state immediately, and paired
//! with the effect that carries them to the server; the matching
//! confirmation or failure event reconciles the state afterwards.
//!
//! Per-resource policy:
//!
//! | resource | policy                                   |
//! |----------|------------------------------------------|
//! | likes    | optimistic, revert on failure            |
//! | todos    | optimistic, server re-decode on success  |
//! | comments | refetch after confirmation, no optimism  |

use crate::effects;
use crate::state::{PostAction, PostSession, PostSnapshot, Session};
use daylog_client::{Category, NewComment, NewPost, PostService, UpdatePost};
use daylog_core::environment::{Clock, IdGenerator};
use daylog_core::reducer::{Effects, Reducer};
use daylog_core::todo::{self, TodoItem};
use smallvec::smallvec;
use std::sync::Arc;

const SIGN_IN_NOTICE: &str = "Sign in to do that";
const EMPTY_TITLE_NOTICE: &str = "Title cannot be empty";

/// Environment dependencies for the post reducer
#[derive(Clone)]
pub struct PostEnvironment {
    /// The post aggregate service
    pub service: Arc<dyn PostService>,
    /// Clock for schedule dates
    pub clock: Arc<dyn Clock>,
    /// Fresh ids for todos the user just typed
    pub ids: Arc<dyn IdGenerator>,
    /// The current principal
    pub session: Session,
}

impl PostEnvironment {
    /// Creates a new `PostEnvironment`
    #[must_use]
    pub fn new(
        service: Arc<dyn PostService>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        session: Session,
    ) -> Self {
        Self {
            service,
            clock,
            ids,
            session,
        }
    }
}

/// Reducer for the post-editing session
#[derive(Clone, Debug, Default)]
pub struct PostReducer;

impl PostReducer {
    /// Creates a new `PostReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Author hint for todo mutations. With no post loaded the list is a
    /// local draft and anyone may edit it.
    fn may_edit_todos(state: &PostSession, session: &Session) -> bool {
        match &state.post {
            Some(post) => session.is_author(post),
            None => true,
        }
    }

    /// Whether the session may delete the given comment: its author, or
    /// the post's author. A hint only; the service re-checks.
    fn may_delete_comment(state: &PostSession, session: &Session, comment_id: &str) -> bool {
        let Some(comment) = state.find_comment(comment_id) else {
            return false;
        };
        let by_comment_author = session.user_id.as_deref() == Some(comment.author_id.as_str());
        let by_post_author = state.post.as_ref().is_some_and(|p| session.is_author(p));
        by_comment_author || by_post_author
    }

    /// Snapshot the list, mark the save in flight, and build the
    /// full-list replace effect. Call only with a loaded post.
    fn persist_todos(
        state: &mut PostSession,
        env: &PostEnvironment,
        previous: Vec<TodoItem>,
        post: &PostSnapshot,
    ) -> Effects<PostAction> {
        state.previous_todos = Some(previous);
        state.saving = true;

        let update = UpdatePost {
            title: post.title.clone(),
            content: todo::encode(&state.todos),
            media_url: post.media_url.clone(),
            media_type: post.media_type,
        };

        smallvec![effects::persist_todos(
            Arc::clone(&env.service),
            post.id.clone(),
            update,
        )]
    }
}

impl Reducer for PostReducer {
    type State = PostSession;
    type Action = PostAction;
    type Environment = PostEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action keeps the protocol in one place
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            // ========== Commands ==========
            PostAction::LoadPost { post_id } => {
                if state.loading {
                    return smallvec![];
                }
                state.loading = true;
                smallvec![effects::load_post(Arc::clone(&env.service), post_id)]
            },

            PostAction::ToggleLike => {
                if state.liking {
                    return smallvec![];
                }
                let Some(post) = &state.post else {
                    return smallvec![];
                };
                if env.session.user_id.is_none() {
                    state.last_notice = Some(SIGN_IN_NOTICE.to_string());
                    return smallvec![];
                }

                // Optimistic flip; the snapshot is the rollback target.
                state.previous_like = Some((state.liked, state.like_count));
                state.liked = !state.liked;
                state.like_count = if state.liked {
                    state.like_count.saturating_add(1)
                } else {
                    state.like_count.saturating_sub(1)
                };
                state.liking = true;

                smallvec![effects::toggle_like(
                    Arc::clone(&env.service),
                    post.id.clone(),
                )]
            },

            PostAction::AddTodo { text } => {
                if state.saving || !Self::may_edit_todos(state, &env.session) {
                    return smallvec![];
                }
                let text = text.trim();
                if text.is_empty() {
                    return smallvec![];
                }

                let previous = state.todos.clone();
                state
                    .todos
                    .push(TodoItem::new(env.ids.next_id(), text.to_string()));

                match state.post.clone() {
                    Some(post) => Self::persist_todos(state, env, previous, &post),
                    // Draft mode: nothing to persist to yet.
                    None => smallvec![],
                }
            },

            PostAction::ToggleTodo { id } => {
                if state.saving || !Self::may_edit_todos(state, &env.session) {
                    return smallvec![];
                }
                if !state.has_todo(&id) {
                    return smallvec![];
                }

                let previous = state.todos.clone();
                for item in &mut state.todos {
                    if item.id == id {
                        item.completed = !item.completed;
                    }
                }

                match state.post.clone() {
                    Some(post) => Self::persist_todos(state, env, previous, &post),
                    None => smallvec![],
                }
            },

            PostAction::RemoveTodo { id } => {
                if state.saving || !Self::may_edit_todos(state, &env.session) {
                    return smallvec![];
                }
                if !state.has_todo(&id) {
                    return smallvec![];
                }

                let previous = state.todos.clone();
                state.todos.retain(|item| item.id != id);

                match state.post.clone() {
                    Some(post) => Self::persist_todos(state, env, previous, &post),
                    None => smallvec![],
                }
            },

            PostAction::SubmitComment { text, parent_id } => {
                if state.submitting {
                    return smallvec![];
                }
                let Some(post) = &state.post else {
                    return smallvec![];
                };
                if env.session.user_id.is_none() {
                    state.last_notice = Some(SIGN_IN_NOTICE.to_string());
                    return smallvec![];
                }
                let text = text.trim();
                if text.is_empty() {
                    return smallvec![];
                }

                state.submitting = true;
                smallvec![effects::submit_comment(
                    Arc::clone(&env.service),
                    post.id.clone(),
                    NewComment {
                        content: text.to_string(),
                        parent_id,
                    },
                )]
            },

            PostAction::DeleteComment { comment_id } => {
                if state.submitting {
                    return smallvec![];
                }
                if env.session.user_id.is_none() {
                    state.last_notice = Some(SIGN_IN_NOTICE.to_string());
                    return smallvec![];
                }
                if !Self::may_delete_comment(state, &env.session, &comment_id) {
                    return smallvec![];
                }

                state.submitting = true;
                smallvec![effects::delete_comment(
                    Arc::clone(&env.service),
                    comment_id,
                )]
            },

            PostAction::LoadComments => {
                if state.comments_loading {
                    return smallvec![];
                }
                let Some(post) = &state.post else {
                    return smallvec![];
                };
                state.comments_loading = true;
                smallvec![effects::fetch_comments(
                    Arc::clone(&env.service),
                    post.id.clone(),
                )]
            },

            PostAction::CreatePost { title, category } => {
                if state.creating || state.post.is_some() {
                    return smallvec![];
                }
                if env.session.user_id.is_none() {
                    state.last_notice = Some(SIGN_IN_NOTICE.to_string());
                    return smallvec![];
                }
                let title = title.trim();
                if title.is_empty() {
                    state.last_notice = Some(EMPTY_TITLE_NOTICE.to_string());
                    return smallvec![];
                }

                state.creating = true;
                let new_post = NewPost {
                    title: title.to_string(),
                    content: todo::encode(&state.todos),
                    category,
                    date: (category == Category::Schedule).then(|| env.clock.now()),
                    media_url: None,
                    media_type: None,
                };
                smallvec![effects::create_post(Arc::clone(&env.service), new_post)]
            },

            // ========== Events ==========
            PostAction::PostLoaded { post } => {
                state.loading = false;
                state.apply_post(&post, &env.session);
                smallvec![]
            },

            PostAction::PostLoadFailed { error } => {
                state.loading = false;
                state.last_notice = Some(error);
                smallvec![]
            },

            PostAction::LikeConfirmed { liked, like_count } => {
                state.liking = false;
                state.previous_like = None;
                // Server is authoritative on convergence; the count stays
                // local arithmetic unless the server reports one.
                state.liked = liked;
                if let Some(count) = like_count {
                    state.like_count = count;
                }
                smallvec![]
            },

            PostAction::LikeFailed { error } => {
                state.liking = false;
                if let Some((liked, like_count)) = state.previous_like.take() {
                    state.liked = liked;
                    state.like_count = like_count;
                }
                state.last_notice = Some(error);
                smallvec![]
            },

            PostAction::TodosSaved { post } => {
                state.saving = false;
                state.previous_todos = None;
                // Reset from the server's returned content, not the local
                // list: guards against server-side normalization.
                state.post = Some(PostSnapshot::from(&post));
                state.todos = todo::decode(&post.content);
                state.last_notice = None;
                smallvec![]
            },

            PostAction::TodosSaveFailed { error } => {
                state.saving = false;
                if let Some(previous) = state.previous_todos.take() {
                    state.todos = previous;
                }
                state.last_notice = Some(error);
                smallvec![]
            },

            PostAction::CommentSubmitted => {
                state.submitting = false;
                state.comment_count = state.comment_count.saturating_add(1);
                // Refetch-confirm: the thread comes back from the server.
                match &state.post {
                    Some(post) => {
                        state.comments_loading = true;
                        smallvec![effects::fetch_comments(
                            Arc::clone(&env.service),
                            post.id.clone(),
                        )]
                    },
                    None => smallvec![],
                }
            },

            PostAction::CommentSubmitFailed { error } => {
                state.submitting = false;
                state.last_notice = Some(error);
                smallvec![]
            },

            PostAction::CommentsLoaded { comments } => {
                state.comments_loading = false;
                state.comments = comments;
                smallvec![]
            },

            PostAction::CommentsLoadFailed { error } => {
                state.comments_loading = false;
                state.last_notice = Some(error);
                smallvec![]
            },

            PostAction::CommentDeleted => {
                state.submitting = false;
                state.comment_count = state.comment_count.saturating_sub(1);
                match &state.post {
                    Some(post) => {
                        state.comments_loading = true;
                        smallvec![effects::fetch_comments(
                            Arc::clone(&env.service),
                            post.id.clone(),
                        )]
                    },
                    None => smallvec![],
                }
            },

            PostAction::CommentDeleteFailed { error } => {
                state.submitting = false;
                state.last_notice = Some(error);
                smallvec![]
            },

            PostAction::PostCreated { post } => {
                state.creating = false;
                state.apply_post(&post, &env.session);
                smallvec![]
            },

            PostAction::PostCreateFailed { error } => {
                state.creating = false;
                state.last_notice = Some(error);
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use daylog_client::{AuthorPayload, Counts, PostPayload};
    use daylog_core::environment::SystemClock;
    use daylog_testing::mocks::SequentialIds;
    use daylog_testing::{InMemoryPostService, ReducerTest, reducer_test::assertions};

    fn test_env(session: Session) -> PostEnvironment {
        PostEnvironment::new(
            Arc::new(InMemoryPostService::new()),
            Arc::new(SystemClock),
            Arc::new(SequentialIds::new()),
            session,
        )
    }

    fn payload(content: &str) -> PostPayload {
        PostPayload {
            id: "p1".to_string(),
            title: "groceries".to_string(),
            content: content.to_string(),
            category: Some(Category::Daily),
            date: None,
            media_url: None,
            media_type: None,
            author_id: "u1".to_string(),
            created_at: chrono::Utc::now(),
            author: AuthorPayload {
                nickname: "mina".to_string(),
            },
            likes: Vec::new(),
            counts: Counts::default(),
        }
    }

    /// Session state as the post's author, with content already loaded.
    fn loaded_state(content: &str) -> PostSession {
        let mut state = PostSession::new();
        state.apply_post(&payload(content), &Session::signed_in("u1"));
        state
    }

    #[test]
    fn add_todo_appends_and_persists() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(loaded_state("[]"))
            .when_action(PostAction::AddTodo {
                text: "  buy milk  ".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 1);
                assert_eq!(state.todos[0].text, "buy milk");
                assert!(!state.todos[0].completed);
                assert!(state.saving);
                assert_eq!(state.previous_todos.as_deref(), Some(&[][..]));
            })
            .then_effects(|effects| assertions::assert_future_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn whitespace_only_add_is_a_noop() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(loaded_state("[]"))
            .when_action(PostAction::AddTodo {
                text: "   ".to_string(),
            })
            .then_state(|state| {
                assert!(state.todos.is_empty());
                assert!(!state.saving);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn todo_commands_are_gated_while_saving() {
        let mut state = loaded_state(r#"[{"text":"milk","completed":false}]"#);
        state.saving = true;

        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(state)
            .when_action(PostAction::ToggleTodo {
                id: "0-milk".to_string(),
            })
            .then_state(|state| {
                assert!(!state.todos[0].completed);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn toggle_unknown_id_is_a_noop() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(loaded_state(r#"[{"text":"milk","completed":false}]"#))
            .when_action(PostAction::ToggleTodo {
                id: "missing".to_string(),
            })
            .then_state(|state| {
                assert!(!state.saving);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn toggle_flips_and_snapshots_previous_list() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(loaded_state(r#"[{"text":"milk","completed":false}]"#))
            .when_action(PostAction::ToggleTodo {
                id: "0-milk".to_string(),
            })
            .then_state(|state| {
                assert!(state.todos[0].completed);
                let previous = state.previous_todos.as_ref().unwrap();
                assert!(!previous[0].completed);
                assert!(state.saving);
            })
            .then_effects(|effects| assertions::assert_future_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn remove_preserves_relative_order() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(loaded_state(r#"["a","b","c"]"#))
            .when_action(PostAction::RemoveTodo {
                id: "1-b".to_string(),
            })
            .then_state(|state| {
                let texts: Vec<&str> = state.todos.iter().map(|t| t.text.as_str()).collect();
                assert_eq!(texts, vec!["a", "c"]);
            })
            .run();
    }

    #[test]
    fn non_author_todo_mutation_is_refused() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u2")))
            .given_state(loaded_state("[]"))
            .when_action(PostAction::AddTodo {
                text: "sneaky".to_string(),
            })
            .then_state(|state| {
                assert!(state.todos.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn draft_mode_todo_mutations_stay_local() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(PostSession::new())
            .when_action(PostAction::AddTodo {
                text: "draft item".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.todos.len(), 1);
                assert!(!state.saving);
                assert!(state.previous_todos.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn like_flips_optimistically() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u2")))
            .given_state(loaded_state("[]"))
            .when_action(PostAction::ToggleLike)
            .then_state(|state| {
                assert!(state.liked);
                assert_eq!(state.like_count, 1);
                assert!(state.liking);
                assert_eq!(state.previous_like, Some((false, 0)));
            })
            .then_effects(|effects| assertions::assert_future_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn like_failure_reverts_flag_and_count() {
        let mut state = loaded_state("[]");
        state.liked = true;
        state.like_count = 5;
        state.liking = true;
        state.previous_like = Some((false, 4));

        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u2")))
            .given_state(state)
            .when_action(PostAction::LikeFailed {
                error: "boom".to_string(),
            })
            .then_state(|state| {
                assert!(!state.liked);
                assert_eq!(state.like_count, 4);
                assert!(!state.liking);
                assert_eq!(state.last_notice.as_deref(), Some("boom"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn like_confirmation_takes_server_values() {
        let mut state = loaded_state("[]");
        state.liked = true;
        state.like_count = 3;
        state.liking = true;

        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u2")))
            .given_state(state)
            .when_action(PostAction::LikeConfirmed {
                liked: false,
                like_count: Some(7),
            })
            .then_state(|state| {
                assert!(!state.liked);
                assert_eq!(state.like_count, 7);
                assert!(!state.liking);
            })
            .run();
    }

    #[test]
    fn like_confirmation_without_count_keeps_local_arithmetic() {
        let mut state = loaded_state("[]");
        state.liked = true;
        state.like_count = 3;
        state.liking = true;

        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u2")))
            .given_state(state)
            .when_action(PostAction::LikeConfirmed {
                liked: true,
                like_count: None,
            })
            .then_state(|state| {
                assert_eq!(state.like_count, 3);
            })
            .run();
    }

    #[test]
    fn anonymous_like_is_refused_locally() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::anonymous()))
            .given_state(loaded_state("[]"))
            .when_action(PostAction::ToggleLike)
            .then_state(|state| {
                assert!(!state.liked);
                assert!(state.last_notice.is_some());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failed_save_restores_the_snapshot() {
        let mut state = loaded_state(r#"["a"]"#);
        state.previous_todos = Some(state.todos.clone());
        state.todos[0].completed = true;
        state.saving = true;

        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(state)
            .when_action(PostAction::TodosSaveFailed {
                error: "boom".to_string(),
            })
            .then_state(|state| {
                assert!(!state.todos[0].completed);
                assert!(!state.saving);
                assert!(state.previous_todos.is_none());
                assert!(state.last_notice.is_some());
            })
            .run();
    }

    #[test]
    fn successful_save_resyncs_from_server_content() {
        let mut state = loaded_state("[]");
        state.todos = vec![TodoItem::new("local-id".to_string(), "milk".to_string())];
        state.saving = true;

        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(state)
            .when_action(PostAction::TodosSaved {
                post: payload(r#"[{"text":"milk","completed":false}]"#),
            })
            .then_state(|state| {
                assert!(!state.saving);
                assert_eq!(state.todos.len(), 1);
                // Re-decoded from the echo: the id is the deterministic
                // decode id, not the session-local one.
                assert_eq!(state.todos[0].id, "0-milk");
            })
            .run();
    }

    #[test]
    fn empty_comment_is_refused_locally() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u2")))
            .given_state(loaded_state("[]"))
            .when_action(PostAction::SubmitComment {
                text: "  ".to_string(),
                parent_id: None,
            })
            .then_state(|state| {
                assert!(!state.submitting);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn comment_confirmation_bumps_count_and_refetches() {
        let mut state = loaded_state("[]");
        state.submitting = true;
        state.comment_count = 2;

        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u2")))
            .given_state(state)
            .when_action(PostAction::CommentSubmitted)
            .then_state(|state| {
                assert!(!state.submitting);
                assert_eq!(state.comment_count, 3);
                assert!(state.comments_loading);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn create_post_with_empty_title_is_refused() {
        ReducerTest::new(PostReducer::new())
            .with_env(test_env(Session::signed_in("u1")))
            .given_state(PostSession::new())
            .when_action(PostAction::CreatePost {
                title: "   ".to_string(),
                category: Category::Daily,
            })
            .then_state(|state| {
                assert!(!state.creating);
                assert_eq!(state.last_notice.as_deref(), Some(EMPTY_TITLE_NOTICE));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
