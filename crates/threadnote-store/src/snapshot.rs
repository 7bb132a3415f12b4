//! On-disk snapshot format.
//!
//! ```json
//! {
//!   "orgs": [{"id": 42, "name": "sgtest"}],
//!   "users": [{"id": 1, "username": "nick"}],
//!   "emails": [{"user_id": 1, "email": "nick@sourcegraph.com", "verified": true}],
//!   "members": [{"org_id": 42, "user_id": 1}],
//!   "org_repos": [{"id": 1, "org_id": 42, "canonical_remote_id": "github.com/foo/bar"}],
//!   "threads": [{"id": 1, "org_repo_id": 1, "repo_revision_path": "foo.go"}],
//!   "comments": []
//! }
//! ```
//!
//! Missing sections default to empty. The order of `members` is the roster
//! order used for org-wide mentions; `comments` are kept in posting order.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use threadnote_models::{Comment, CommentId, Org, OrgMember, OrgRepo, Thread, User, UserEmail};

use crate::atomic::{atomic_write_json, read_json};
use crate::error::{Result, StoreError};

/// Everything the store knows, as loaded from or saved to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub orgs: Vec<Org>,
    pub users: Vec<User>,
    pub emails: Vec<UserEmail>,
    pub members: Vec<OrgMember>,
    pub org_repos: Vec<OrgRepo>,
    pub threads: Vec<Thread>,
    pub comments: Vec<Comment>,
}

impl Snapshot {
    /// Loads and validates a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let snapshot: Snapshot = read_json(path)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Saves the snapshot atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        atomic_write_json(path, self)
    }

    /// Checks that IDs are unique and references point at existing records.
    pub fn validate(&self) -> Result<()> {
        unique("org", self.orgs.iter().map(|o| o.id.get()))?;
        unique("user", self.users.iter().map(|u| u.id.get()))?;
        unique("org repo", self.org_repos.iter().map(|r| r.id.get()))?;
        unique("thread", self.threads.iter().map(|t| t.id.get()))?;
        unique("comment", self.comments.iter().map(|c| c.id.get()))?;

        for repo in &self.org_repos {
            if !self.orgs.iter().any(|o| o.id == repo.org_id) {
                return Err(StoreError::InvalidData(format!(
                    "org repo {} belongs to unknown org {}",
                    repo.id, repo.org_id
                )));
            }
        }
        for thread in &self.threads {
            if !self.org_repos.iter().any(|r| r.id == thread.org_repo_id) {
                return Err(StoreError::InvalidData(format!(
                    "thread {} belongs to unknown org repo {}",
                    thread.id, thread.org_repo_id
                )));
            }
        }
        for comment in &self.comments {
            if !self.threads.iter().any(|t| t.id == comment.thread_id) {
                return Err(StoreError::InvalidData(format!(
                    "comment {} belongs to unknown thread {}",
                    comment.id, comment.thread_id
                )));
            }
        }
        Ok(())
    }

    /// Returns the next free comment ID.
    ///
    /// Fails with [`StoreError::InvalidData`] once the ID space is used up.
    pub fn next_comment_id(&self) -> Result<CommentId> {
        let max = self.comments.iter().map(|c| c.id.get()).max().unwrap_or(0);
        max.checked_add(1).map(CommentId::new).ok_or_else(|| {
            StoreError::InvalidData(format!("no comment id left after {}", max))
        })
    }
}

fn unique(kind: &str, ids: impl Iterator<Item = i32>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(StoreError::InvalidData(format!("duplicate {} id {}", kind, id)));
        }
    }
    Ok(())
}
