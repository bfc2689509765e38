//! # daylog Posts
//!
//! The post-editing session: state, actions, and reducer for one post's
//! todo list, likes, and comments.
//!
//! This is where the optimistic mutation protocol lives. Every mutation
//! follows the same shape:
//!
//! 1. Validate the command locally (author hint, non-empty text, no
//!    mutation already in flight for the resource)
//! 2. Apply the state change immediately, snapshotting the previous value
//! 3. Issue the remote call as an effect
//! 4. Reconcile on the confirmation event: keep (and re-sync from the
//!    server where it is authoritative) on success, restore the snapshot
//!    on failure
//!
//! Todos persist as a full-list replace: the whole list is re-encoded and
//! sent through `PUT /posts/{id}` on every add/toggle/remove. Comments
//! are the deliberate exception to optimism - they are refetched after
//! server confirmation instead of inserted locally.

pub mod reducer;
pub mod state;

mod effects;

pub use reducer::{PostEnvironment, PostReducer};
pub use state::{PostAction, PostSession, PostSnapshot, Session};
