//! Lookups the fan-out needs from the user and org store.
//!
//! The `Directory` trait is the seam between the notification logic and
//! whatever holds users, emails and org memberships. Callers pass an
//! implementation in explicitly; nothing here reaches for global state.
//!
//! Every lookup separates two outcomes:
//! - `Err(LookupError)`: the store itself failed, the caller must abort
//! - `Ok(Resolution::NotFound)`: the record does not exist, which the fan-out
//!   treats as "nobody to notify"

use std::collections::BTreeSet;

use threadnote_models::{OrgId, User, UserId};

use crate::error::LookupError;

/// Outcome of a lookup that may legitimately find nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// The record exists.
    Found(T),
    /// No such record. Not an error.
    NotFound,
}

impl<T> Resolution<T> {
    /// Converts into an `Option`, mapping `NotFound` to `None`.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}

/// Read access to users, their emails and org rosters.
///
/// All methods are synchronous; an implementation backed by a remote store is
/// expected to block.
pub trait Directory {
    /// Looks up a user by ID.
    fn user(&self, id: UserId) -> Result<Resolution<User>, LookupError>;

    /// Looks up the verified email of a user.
    fn email(&self, id: UserId) -> Result<Resolution<String>, LookupError>;

    /// Returns the members of `org` matching any of `ids` or `usernames`.
    ///
    /// Usernames match ASCII case-insensitively. Entries that match nobody are
    /// dropped without error.
    fn org_members(
        &self,
        org: OrgId,
        ids: &BTreeSet<UserId>,
        usernames: &BTreeSet<String>,
    ) -> Result<Vec<User>, LookupError>;

    /// Returns the verified emails of every member of `org`, in roster order,
    /// skipping the users in `exclude`.
    fn all_org_emails(
        &self,
        org: OrgId,
        exclude: &BTreeSet<UserId>,
    ) -> Result<Vec<String>, LookupError>;
}

impl<D: Directory + ?Sized> Directory for &D {
    fn user(&self, id: UserId) -> Result<Resolution<User>, LookupError> {
        (**self).user(id)
    }

    fn email(&self, id: UserId) -> Result<Resolution<String>, LookupError> {
        (**self).email(id)
    }

    fn org_members(
        &self,
        org: OrgId,
        ids: &BTreeSet<UserId>,
        usernames: &BTreeSet<String>,
    ) -> Result<Vec<User>, LookupError> {
        (**self).org_members(org, ids, usernames)
    }

    fn all_org_emails(
        &self,
        org: OrgId,
        exclude: &BTreeSet<UserId>,
    ) -> Result<Vec<String>, LookupError> {
        (**self).all_org_emails(org, exclude)
    }
}
