//! Mention scanner for comment bodies.
//!
//! Extracts `@name` handles from free-form text:
//! ```text
//! Dude, I am on vacation. Ask @sqs or @John
//! ```
//! yields `sqs`, `John`.
//!
//! A mention starts at an `@` that is not preceded by `[A-Za-z0-9_-]`, so
//! email addresses such as `renfred@sourcegraph.com` are never mentions. The
//! handle is a run of letters, digits and hyphens starting with a letter or
//! digit; an underscore or any other character ends it.

use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Regex matching a mention. Group 1 is the handle.
///
/// The leading group consumes the boundary character since the regex crate
/// has no lookbehind. Handles always end in a word character, so consuming
/// the boundary never eats into a previous match.
static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Za-z0-9_-])@([A-Za-z0-9][A-Za-z0-9-]*)").expect("Invalid mention regex")
});

/// A handle extracted from an `@` mention, without the `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mention(String);

impl Mention {
    /// Parses a bare handle, returning `None` unless the whole string is a
    /// valid mention handle.
    ///
    /// # Example
    /// ```
    /// use threadnote_core::Mention;
    ///
    /// assert!(Mention::parse("alice-w").is_some());
    /// assert!(Mention::parse("alice_w").is_none());
    /// ```
    pub fn parse(handle: &str) -> Option<Self> {
        let mut found = scan_mentions(&format!("@{}", handle));
        match found.pop() {
            Some(mention) if found.is_empty() && mention.0 == handle => Some(mention),
            _ => None,
        }
    }

    /// Returns the handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the mention, returning the handle.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Mention {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Mention {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Extract the mentions from `text` in order of first appearance.
///
/// Repeated mentions are reported once. Malformed mentions are skipped.
///
/// # Example
/// ```
/// use threadnote_core::scan_mentions;
///
/// let found = scan_mentions("hello.@alice.@bob!@nick? @alice");
/// let handles: Vec<&str> = found.iter().map(|m| m.as_str()).collect();
/// assert_eq!(handles, ["alice", "bob", "nick"]);
/// ```
pub fn scan_mentions(text: &str) -> Vec<Mention> {
    let mut seen = HashSet::new();
    let mut mentions = Vec::new();

    for cap in MENTION_REGEX.captures_iter(text) {
        let Some(handle) = cap.get(1) else {
            continue;
        };
        // Hyphens are allowed inside a handle but not at its end
        let handle = handle.as_str().trim_end_matches('-');
        if seen.insert(handle) {
            mentions.push(Mention(handle.to_string()));
        }
    }

    mentions
}
