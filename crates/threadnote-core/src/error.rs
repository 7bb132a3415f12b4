//! Error types for fan-out and comment creation.

use thiserror::Error;
use threadnote_models::{OrgId, OrgRepoId, ThreadId, UserId};

/// A lookup against a store failed outright.
///
/// This is an infrastructure failure. A record that simply does not exist is
/// reported as [`Resolution::NotFound`](crate::Resolution) instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The backing store could not be reached or answered with an error.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Lock poisoned (thread panicked while holding lock).
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Errors that can occur while computing or delivering notifications.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// A lookup failed; the whole computation is aborted.
    #[error("lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// The thread, its repository or its org could not be resolved.
    #[error("access denied: {kind} {id} not found")]
    AccessDenied { kind: &'static str, id: i32 },

    /// The comment author does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The comment author has no verified email.
    #[error("no verified email for user {0}")]
    EmailNotFound(UserId),

    /// Fan-out was asked to run over a thread with no comments.
    #[error("thread has no comments")]
    EmptyThread,

    /// The dispatcher failed to hand off the notification.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}

impl NotifyError {
    pub(crate) fn thread_denied(id: ThreadId) -> Self {
        Self::AccessDenied {
            kind: ThreadId::kind(),
            id: id.get(),
        }
    }

    pub(crate) fn repo_denied(id: OrgRepoId) -> Self {
        Self::AccessDenied {
            kind: OrgRepoId::kind(),
            id: id.get(),
        }
    }

    pub(crate) fn org_denied(id: OrgId) -> Self {
        Self::AccessDenied {
            kind: OrgId::kind(),
            id: id.get(),
        }
    }

    /// Returns true if the request was refused before anything was persisted.
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

/// Result type alias for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;
