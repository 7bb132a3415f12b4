//! MemoryStore - thread-safe in-memory store over a snapshot.
//!
//! Uses `Arc<RwLock<Snapshot>>`: lookups take the read lock, posting a comment
//! takes the write lock. Clones share the same data.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use threadnote_core::{Directory, LookupError, Resolution, ThreadStore};
use threadnote_models::{
    Comment, NewComment, Org, OrgId, OrgRepo, OrgRepoId, Thread, ThreadId, User, UserId,
};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::snapshot::Snapshot;

/// In-memory users, orgs, threads and comments.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Snapshot>>,
}

impl MemoryStore {
    /// Creates a store over an already loaded snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            data: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Loads a store from a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let snapshot = Snapshot::load(path)?;
        info!(
            path = %path.display(),
            users = snapshot.users.len(),
            threads = snapshot.threads.len(),
            comments = snapshot.comments.len(),
            "Loaded snapshot"
        );
        Ok(Self::new(snapshot))
    }

    /// Writes the current contents to a snapshot file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.read()?.save(path)?;
        debug!(path = %path.display(), "Saved snapshot");
        Ok(())
    }

    /// Returns a copy of the current contents.
    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Snapshot>> {
        self.data
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

/// Verified email of `id`, if any.
fn verified_email(data: &Snapshot, id: UserId) -> Option<String> {
    data.emails
        .iter()
        .find(|e| e.user_id == id && e.verified)
        .map(|e| e.email.clone())
}

impl Directory for MemoryStore {
    fn user(&self, id: UserId) -> std::result::Result<Resolution<User>, LookupError> {
        let data = self.read()?;
        Ok(data.users.iter().find(|u| u.id == id).cloned().into())
    }

    fn email(&self, id: UserId) -> std::result::Result<Resolution<String>, LookupError> {
        let data = self.read()?;
        Ok(verified_email(&data, id).into())
    }

    fn org_members(
        &self,
        org: OrgId,
        ids: &BTreeSet<UserId>,
        usernames: &BTreeSet<String>,
    ) -> std::result::Result<Vec<User>, LookupError> {
        let data = self.read()?;
        let members = data
            .members
            .iter()
            .filter(|m| m.org_id == org)
            .filter_map(|m| data.users.iter().find(|u| u.id == m.user_id))
            .filter(|u| ids.contains(&u.id) || usernames.iter().any(|n| u.answers_to(n)))
            .cloned()
            .collect();
        Ok(members)
    }

    fn all_org_emails(
        &self,
        org: OrgId,
        exclude: &BTreeSet<UserId>,
    ) -> std::result::Result<Vec<String>, LookupError> {
        let data = self.read()?;
        let emails = data
            .members
            .iter()
            .filter(|m| m.org_id == org && !exclude.contains(&m.user_id))
            .filter_map(|m| verified_email(&data, m.user_id))
            .collect();
        Ok(emails)
    }
}

impl ThreadStore for MemoryStore {
    fn thread(&self, id: ThreadId) -> std::result::Result<Resolution<Thread>, LookupError> {
        let data = self.read()?;
        Ok(data.threads.iter().find(|t| t.id == id).cloned().into())
    }

    fn org_repo(&self, id: OrgRepoId) -> std::result::Result<Resolution<OrgRepo>, LookupError> {
        let data = self.read()?;
        Ok(data.org_repos.iter().find(|r| r.id == id).cloned().into())
    }

    fn org(&self, id: OrgId) -> std::result::Result<Resolution<Org>, LookupError> {
        let data = self.read()?;
        Ok(data.orgs.iter().find(|o| o.id == id).cloned().into())
    }

    fn create_comment(&self, comment: NewComment) -> std::result::Result<Comment, LookupError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| LookupError::LockPoisoned(e.to_string()))?;

        if !data.threads.iter().any(|t| t.id == comment.thread_id) {
            return Err(LookupError::Unavailable(format!(
                "thread {} vanished before the comment was stored",
                comment.thread_id
            )));
        }

        let id = data.next_comment_id()?;
        let stored = comment.into_comment(id);
        data.comments.push(stored.clone());
        debug!(comment_id = %stored.id, thread_id = %stored.thread_id, "Stored comment");
        Ok(stored)
    }

    fn comments(&self, thread: ThreadId) -> std::result::Result<Vec<Comment>, LookupError> {
        let data = self.read()?;
        Ok(data
            .comments
            .iter()
            .filter(|c| c.thread_id == thread)
            .cloned()
            .collect())
    }
}
