//! # daylog Core
//!
//! Core traits and types for the daylog synchronization core.
//!
//! This crate provides the fundamental abstractions for the post-editing
//! session: the Reducer pattern that drives optimistic mutations, and the
//! todo content codec that turns a post's opaque `content` string into a
//! structured list and back.
//!
//! ## Core Concepts
//!
//! - **State**: owned, cloneable session state for a feature
//! - **Action**: all possible inputs to a reducer (user commands and
//!   server confirmations)
//! - **Reducer**: pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: side effect descriptions (not execution)
//! - **Environment**: injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};

/// Todo content codec and item types.
pub mod todo;

/// Reducer module - the core trait for session logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all optimistic-update and rollback logic and are
/// deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The number of effects a reducer can return without allocating.
    ///
    /// Four covers every arm in practice: a confirmation rarely fans out
    /// into more than a notice plus a follow-up fetch.
    pub const INLINE_EFFECTS: usize = 4;

    /// Effect list returned from [`Reducer::reduce`].
    pub type Effects<A> = SmallVec<[Effect<A>; INLINE_EFFECTS]>;

    /// The Reducer trait - core abstraction for session logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: the session state this reducer operates on
    /// - `Action`: the action type this reducer processes
    /// - `Environment`: the injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for PostReducer {
    ///     type State = PostSession;
    ///     type Action = PostAction;
    ///     type Environment = PostEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut PostSession,
    ///         action: PostAction,
    ///         env: &PostEnvironment,
    ///     ) -> Effects<PostAction> {
    ///         match action {
    ///             PostAction::ToggleLike => {
    ///                 // flip local state, return the remote-call effect
    ///                 smallvec![]
    ///             }
    ///             _ => smallvec![],
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: mutable reference to current state
        /// - `action`: the action to process
        /// - `env`: reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Effects<Self::Action>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution) and are composable.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store
    /// runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: the action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Run effects sequentially
        Sequential(Vec<Effect<Action>>),

        /// Delayed action (for debounced saves, timeouts)
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after the delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if `Some`, the action is fed back
        /// into the reducer. Every remote mutation in the sync core is
        /// expressed as one of these.
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run in parallel
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Wrap an async computation as an effect
        ///
        /// Convenience for the common `Box::pin` dance:
        ///
        /// ```ignore
        /// Effect::future(async move {
        ///     match service.toggle_like(&post_id).await {
        ///         Ok(response) => Some(PostAction::LikeConfirmed { liked: response.liked }),
        ///         Err(error) => Some(PostAction::LikeFailed { error: error.to_string() }),
        ///     }
        /// })
        /// ```
        pub fn future<F>(fut: F) -> Effect<Action>
        where
            F: Future<Output = Option<Action>> + Send + 'static,
        {
            Effect::Future(Box::pin(fut))
        }
    }
}

/// Environment module - dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter. Identity ("who is the current user")
/// is explicit context on each environment, never ambient global state.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Id generator trait - abstracts fresh-id creation for testability
    ///
    /// Newly added todo items need a session-local id before the server
    /// has seen them. Decoded items synthesize deterministic ids instead
    /// (see [`crate::todo::decode`]); this trait is only consulted for
    /// items the user just typed.
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh id, unique within the session
        fn next_id(&self) -> String;
    }

    /// Production id generator backed by random v4 UUIDs
    #[derive(Clone, Copy, Debug, Default)]
    pub struct UuidIds;

    impl IdGenerator for UuidIds {
        fn next_id(&self) -> String {
            uuid::Uuid::new_v4().to_string()
        }
    }
}
