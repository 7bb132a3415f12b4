//! User accounts and their email addresses.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user.
    pub id: UserId,

    /// Username, also the handle used in `@` mentions.
    pub username: String,
}

impl User {
    /// Creates a new user.
    pub fn new(id: impl Into<UserId>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
        }
    }

    /// Returns true if `handle` refers to this user.
    ///
    /// Usernames are compared ASCII case-insensitively, so `@John` finds `john`.
    pub fn answers_to(&self, handle: &str) -> bool {
        self.username.eq_ignore_ascii_case(handle)
    }
}

/// An email address registered for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    /// Owner of the address.
    pub user_id: UserId,

    /// The address itself.
    pub email: String,

    /// Whether the user has verified the address. Only verified addresses
    /// receive notifications.
    #[serde(default)]
    pub verified: bool,
}

impl UserEmail {
    /// Creates a verified email record.
    pub fn verified(user_id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            verified: true,
        }
    }
}
