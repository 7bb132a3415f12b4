//! Insertion-ordered set of notification recipients.

use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// Ordered, deduplicated list of email addresses to notify.
///
/// Addresses keep the position at which they were first inserted; inserting
/// an address that is already present is a no-op. Equality compares the
/// ordered addresses.
#[derive(Debug, Clone, Default)]
pub struct NotificationSet {
    emails: Vec<String>,
    seen: HashSet<String>,
}

impl NotificationSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `email` unless it is already present. Returns true if added.
    pub fn insert(&mut self, email: impl Into<String>) -> bool {
        let email = email.into();
        if self.seen.contains(&email) {
            return false;
        }
        self.seen.insert(email.clone());
        self.emails.push(email);
        true
    }

    /// Removes `email`, keeping the order of the remaining addresses.
    /// Returns true if it was present.
    pub fn remove(&mut self, email: &str) -> bool {
        if !self.seen.remove(email) {
            return false;
        }
        self.emails.retain(|e| e != email);
        true
    }

    /// Returns true if `email` is in the set.
    pub fn contains(&self, email: &str) -> bool {
        self.seen.contains(email)
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Iterates over the addresses in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.emails.iter().map(String::as_str)
    }

    /// Returns the addresses in insertion order.
    pub fn as_slice(&self) -> &[String] {
        &self.emails
    }

    /// Consumes the set, returning the addresses in insertion order.
    pub fn into_vec(self) -> Vec<String> {
        self.emails
    }
}

impl PartialEq for NotificationSet {
    fn eq(&self, other: &Self) -> bool {
        self.emails == other.emails
    }
}

impl Eq for NotificationSet {}

impl<S: Into<String>> Extend<S> for NotificationSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for email in iter {
            self.insert(email);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for NotificationSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for NotificationSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.emails.into_iter()
    }
}

impl Serialize for NotificationSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.emails.serialize(serializer)
    }
}
