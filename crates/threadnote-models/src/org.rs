//! Organizations, their members and their repositories.

use serde::{Deserialize, Serialize};

use crate::ids::{OrgId, OrgRepoId, UserId};

/// An organization. Its name doubles as a broadcast mention handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Org {
    /// Unique identifier for the org.
    pub id: OrgId,

    /// Org name, e.g. "sgtest".
    pub name: String,
}

impl Org {
    /// Creates a new org.
    pub fn new(id: impl Into<OrgId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Membership of a user in an org.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgMember {
    pub org_id: OrgId,
    pub user_id: UserId,
}

/// A repository owned by an org, identified by its canonical remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgRepo {
    /// Unique identifier for the org repo.
    pub id: OrgRepoId,

    /// Org that owns the repo.
    pub org_id: OrgId,

    /// Canonical remote, e.g. "github.com/gorilla/mux".
    pub canonical_remote_id: String,
}
