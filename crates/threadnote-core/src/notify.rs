//! Recipient resolution for a newly posted comment.
//!
//! Recipients are gathered in three passes that append to one
//! [`NotificationSet`]:
//!
//! 1. everyone who has commented on the thread, minus the new comment's author
//! 2. users mentioned in earlier comments, never including the new author
//! 3. users mentioned in the new comment, including the author if they
//!    mention themselves
//!
//! A mention of the org's name (or a configured alias) expands to the whole
//! org roster minus the new author. Mentions that resolve to nobody, and
//! users without a verified email, are skipped.

use std::collections::{BTreeSet, HashSet};

use threadnote_models::{Comment, Org, User};
use tracing::{debug, trace};

use crate::config::NotifyConfig;
use crate::directory::{Directory, Resolution};
use crate::error::{NotifyError, Result};
use crate::mention::{scan_mentions, Mention};
use crate::recipients::NotificationSet;

/// Computes who to notify about a new comment.
pub struct RecipientResolver<D> {
    directory: D,
    config: NotifyConfig,
}

impl<D: Directory> RecipientResolver<D> {
    /// Creates a resolver with the default config.
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            config: NotifyConfig::default(),
        }
    }

    /// Sets the config.
    pub fn with_config(mut self, config: NotifyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Returns the emails to notify about the last comment in `comments`.
    ///
    /// `comments` is the whole thread in chronological order, ending with the
    /// new comment written by `author`. `org` owns the thread's repository.
    ///
    /// # Errors
    /// Fails with [`NotifyError::EmptyThread`] if `comments` is empty, and with
    /// [`NotifyError::Lookup`] if any directory lookup fails. No partial result
    /// is returned.
    pub fn emails_to_notify(
        &self,
        comments: &[Comment],
        author: &User,
        org: &Org,
    ) -> Result<NotificationSet> {
        let (new_comment, history) = comments.split_last().ok_or(NotifyError::EmptyThread)?;
        let mut fan_out = FanOut {
            directory: &self.directory,
            config: &self.config,
            org,
            author,
            roster: None,
            recipients: NotificationSet::new(),
        };

        fan_out
            .recipients
            .extend(comments.iter().map(|c| c.author_email.as_str()));
        fan_out.recipients.remove(&new_comment.author_email);
        trace!(participants = fan_out.recipients.len(), "Collected thread participants");

        let historical = mentions_in(history);
        fan_out.add_mentions(&historical, false)?;

        let fresh = scan_mentions(&new_comment.contents);
        fan_out.add_mentions(&fresh, true)?;

        debug!(
            comment_id = %new_comment.id,
            thread_id = %new_comment.thread_id,
            author = %author.username,
            recipients = fan_out.recipients.len(),
            "Resolved notification recipients"
        );
        Ok(fan_out.recipients)
    }
}

/// Returns the emails to notify about the last comment in `comments`.
///
/// Shorthand for [`RecipientResolver::emails_to_notify`].
pub fn emails_to_notify<D: Directory>(
    directory: D,
    comments: &[Comment],
    author: &User,
    org: &Org,
    config: &NotifyConfig,
) -> Result<NotificationSet> {
    RecipientResolver::new(directory)
        .with_config(config.clone())
        .emails_to_notify(comments, author, org)
}

/// Mentions across `comments`, in order of first appearance.
fn mentions_in(comments: &[Comment]) -> Vec<Mention> {
    let mut seen = HashSet::new();
    comments
        .iter()
        .flat_map(|c| scan_mentions(&c.contents))
        .filter(|m| seen.insert(m.clone()))
        .collect()
}

/// State of one fan-out computation.
struct FanOut<'a, D> {
    directory: &'a D,
    config: &'a NotifyConfig,
    org: &'a Org,
    author: &'a User,
    /// Org roster, fetched on the first broadcast mention.
    roster: Option<Vec<String>>,
    recipients: NotificationSet,
}

impl<D: Directory> FanOut<'_, D> {
    fn is_broadcast(&self, mention: &Mention) -> bool {
        self.config.is_broadcast(mention.as_str(), &self.org.name)
    }

    /// Resolves `mentions` and appends the resulting emails.
    ///
    /// Users are resolved with one batch lookup. The author is skipped unless
    /// `notify_author` is set; broadcasts always skip the author.
    fn add_mentions(&mut self, mentions: &[Mention], notify_author: bool) -> Result<()> {
        let usernames: BTreeSet<String> = mentions
            .iter()
            .filter(|m| !self.is_broadcast(m))
            .map(|m| m.as_str().to_string())
            .collect();
        let members = if usernames.is_empty() {
            Vec::new()
        } else {
            self.directory
                .org_members(self.org.id, &BTreeSet::new(), &usernames)?
        };

        for mention in mentions {
            if self.is_broadcast(mention) {
                self.add_roster()?;
                continue;
            }

            let Some(user) = members.iter().find(|u| u.answers_to(mention.as_str())) else {
                trace!(%mention, "Mention does not match an org member");
                continue;
            };
            if user.id == self.author.id && !notify_author {
                continue;
            }

            match self.directory.email(user.id)? {
                Resolution::Found(email) => {
                    self.recipients.insert(email);
                }
                Resolution::NotFound => {
                    trace!(user_id = %user.id, "Mentioned user has no verified email");
                }
            }
        }
        Ok(())
    }

    /// Appends every org member's email except the author's.
    fn add_roster(&mut self) -> Result<()> {
        if self.roster.is_none() {
            let exclude = BTreeSet::from([self.author.id]);
            let emails = self.directory.all_org_emails(self.org.id, &exclude)?;
            debug!(org = %self.org.name, members = emails.len(), "Expanding org mention");
            self.roster = Some(emails);
        }
        if let Some(roster) = &self.roster {
            self.recipients.extend(roster.iter());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use std::cell::Cell;
    use threadnote_models::{CommentId, NewComment, OrgId, ThreadId, UserId};

    fn comment(author: i32, email: &str, contents: &str) -> Comment {
        NewComment::new(ThreadId::new(1), UserId::new(author), email, contents)
            .into_comment(CommentId::new(0))
    }

    /// Directory with three members: nick (1), renfred (2), sqs (3).
    /// sqs has no verified email.
    #[derive(Default)]
    struct Members {
        fail: bool,
        roster_calls: Cell<usize>,
    }

    impl Members {
        fn users() -> Vec<User> {
            vec![User::new(1, "nick"), User::new(2, "renfred"), User::new(3, "sqs")]
        }
    }

    impl Directory for Members {
        fn user(&self, id: UserId) -> std::result::Result<Resolution<User>, LookupError> {
            Ok(Self::users().into_iter().find(|u| u.id == id).into())
        }

        fn email(&self, id: UserId) -> std::result::Result<Resolution<String>, LookupError> {
            if self.fail {
                return Err(LookupError::Unavailable("email table offline".into()));
            }
            Ok(Self::users()
                .into_iter()
                .find(|u| u.id == id && u.username != "sqs")
                .map(|u| format!("{}@example.com", u.username))
                .into())
        }

        fn org_members(
            &self,
            _org: OrgId,
            _ids: &BTreeSet<UserId>,
            usernames: &BTreeSet<String>,
        ) -> std::result::Result<Vec<User>, LookupError> {
            Ok(Self::users()
                .into_iter()
                .filter(|u| usernames.iter().any(|n| u.answers_to(n)))
                .collect())
        }

        fn all_org_emails(
            &self,
            _org: OrgId,
            exclude: &BTreeSet<UserId>,
        ) -> std::result::Result<Vec<String>, LookupError> {
            self.roster_calls.set(self.roster_calls.get() + 1);
            Ok(Self::users()
                .into_iter()
                .filter(|u| !exclude.contains(&u.id) && u.username != "sqs")
                .map(|u| format!("{}@example.com", u.username))
                .collect())
        }
    }

    fn org() -> Org {
        Org::new(42, "acme")
    }

    #[test]
    fn test_empty_thread_is_an_error() {
        let resolver = RecipientResolver::new(Members::default());
        let err = resolver
            .emails_to_notify(&[], &User::new(1, "nick"), &org())
            .unwrap_err();
        assert!(matches!(err, NotifyError::EmptyThread));
    }

    #[test]
    fn test_user_without_email_is_skipped() {
        let resolver = RecipientResolver::new(Members::default());
        let thread = vec![comment(1, "nick@example.com", "@sqs @renfred")];
        let set = resolver
            .emails_to_notify(&thread, &User::new(1, "nick"), &org())
            .unwrap();
        assert_eq!(set.into_vec(), vec!["renfred@example.com"]);
    }

    #[test]
    fn test_lookup_failure_aborts() {
        let resolver = RecipientResolver::new(Members {
            fail: true,
            ..Default::default()
        });
        let thread = vec![comment(1, "nick@example.com", "ping @renfred")];
        let err = resolver
            .emails_to_notify(&thread, &User::new(1, "nick"), &org())
            .unwrap_err();
        assert!(matches!(err, NotifyError::Lookup(LookupError::Unavailable(_))));
    }

    #[test]
    fn test_roster_fetched_once() {
        let directory = Members::default();
        let resolver = RecipientResolver::new(&directory);
        let thread = vec![
            comment(2, "renfred@example.com", "hey @acme"),
            comment(1, "nick@example.com", "again @acme"),
        ];
        let set = resolver
            .emails_to_notify(&thread, &User::new(1, "nick"), &org())
            .unwrap();

        assert_eq!(set.into_vec(), vec!["renfred@example.com"]);
        assert_eq!(directory.roster_calls.get(), 1);
    }

    #[test]
    fn test_broadcast_alias_from_config() {
        let config = NotifyConfig::new().with_broadcast_alias("everyone");
        let thread = vec![comment(3, "sqs@example.com", "@everyone standup")];
        let set = emails_to_notify(
            Members::default(),
            &thread,
            &User::new(3, "sqs"),
            &org(),
            &config,
        )
        .unwrap();
        assert_eq!(set.into_vec(), vec!["nick@example.com", "renfred@example.com"]);
    }

    #[test]
    fn test_broadcast_wins_over_username() {
        // An org named like a member broadcasts instead of pinging that member
        let org = Org::new(42, "renfred");
        let thread = vec![comment(1, "nick@example.com", "@renfred")];
        let directory = Members::default();
        let set = RecipientResolver::new(&directory)
            .emails_to_notify(&thread, &User::new(1, "nick"), &org)
            .unwrap();
        assert_eq!(set.into_vec(), vec!["renfred@example.com"]);
        assert_eq!(directory.roster_calls.get(), 1);
    }
}
