//! # daylog Testing
//!
//! Testing utilities and helpers for the daylog sync core.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - An in-memory [`daylog_client::PostService`] with failure injection
//! - A fluent Given-When-Then API for reducer tests
//!
//! ## Example
//!
//! ```ignore
//! use daylog_testing::{ReducerTest, mocks::FixedClock};
//!
//! ReducerTest::new(PostReducer)
//!     .with_env(test_environment())
//!     .given_state(PostSession::default())
//!     .when_action(PostAction::AddTodo { text: "milk".into() })
//!     .then_state(|state| assert_eq!(state.todos.len(), 1))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use daylog_core::environment::{Clock, IdGenerator};

pub mod post_service;

pub use post_service::InMemoryPostService;
pub use reducer_test::ReducerTest;

/// Initialize tracing for a test, ignoring repeat initialization.
///
/// Call at the top of integration tests that benefit from log output;
/// respects `RUST_LOG`.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Mock implementations of Environment traits.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use daylog_testing::mocks::FixedClock;
    /// use daylog_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Clone, Copy, Debug)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a clock pinned to `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Sequential id generator for predictable ids
    ///
    /// Produces `"test-id-1"`, `"test-id-2"`, ... in order.
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        next: AtomicU64,
    }

    impl SequentialIds {
        /// Create a generator starting at `test-id-1`
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> String {
            let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
            format!("test-id-{n}")
        }
    }
}
