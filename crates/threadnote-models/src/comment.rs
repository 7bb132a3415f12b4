//! Threads and the comments posted on them.
//!
//! A thread anchors a discussion to a range of lines in one file of an org
//! repository. Comments are appended in chronological order and never edited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CommentId, OrgRepoId, ThreadId, UserId};

/// A comment thread attached to a file range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Unique identifier for the thread.
    pub id: ThreadId,

    /// Repository the thread lives in.
    pub org_repo_id: OrgRepoId,

    /// Path of the file within the repository.
    pub repo_revision_path: String,

    /// Revision the thread was created against.
    #[serde(default)]
    pub repo_revision: String,

    /// First line of the commented range.
    #[serde(default)]
    pub start_line: u32,

    /// Last line of the commented range.
    #[serde(default)]
    pub end_line: u32,
}

/// A comment posted on a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier for the comment.
    pub id: CommentId,

    /// Thread the comment belongs to.
    pub thread_id: ThreadId,

    /// Author of the comment.
    pub author_user_id: UserId,

    /// Email of the author at the time of posting.
    pub author_email: String,

    /// Free-form body, possibly containing `@` mentions.
    pub contents: String,

    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
}

/// A comment that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub thread_id: ThreadId,
    pub author_user_id: UserId,
    pub author_email: String,
    pub contents: String,
}

impl NewComment {
    /// Creates a new unpersisted comment.
    pub fn new(
        thread_id: ThreadId,
        author_user_id: UserId,
        author_email: impl Into<String>,
        contents: impl Into<String>,
    ) -> Self {
        Self {
            thread_id,
            author_user_id,
            author_email: author_email.into(),
            contents: contents.into(),
        }
    }

    /// Turns this into a stored comment with the given ID, stamped now.
    pub fn into_comment(self, id: CommentId) -> Comment {
        Comment {
            id,
            thread_id: self.thread_id,
            author_user_id: self.author_user_id,
            author_email: self.author_email,
            contents: self.contents,
            created_at: Utc::now(),
        }
    }
}
