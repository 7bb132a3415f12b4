//! Access-guarded comment creation.
//!
//! Posting a comment walks a small state machine:
//!
//! ```text
//! Pending ──> Authorized ──> Persisted ──> Notified
//!    │
//!    └──> Denied
//! ```
//!
//! The thread, its org repo, its org and the author must all resolve before
//! anything is written. Any failure up to that point denies the request: no
//! comment is stored and no notification is computed. Once the comment is
//! stored the request succeeds; if the fan-out or the dispatcher fails it
//! stops at `Persisted`.

use threadnote_models::{
    Comment, NewComment, Org, OrgId, OrgRepo, OrgRepoId, Thread, ThreadId, User, UserId,
};
use tracing::{debug, info, warn};

use crate::directory::{Directory, Resolution};
use crate::error::{LookupError, NotifyError, Result};
use crate::message::NotificationMessage;
use crate::notify::RecipientResolver;
use crate::recipients::NotificationSet;

/// Where a comment creation request currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreationState {
    /// Request received, nothing checked yet.
    Pending,
    /// Thread, repo, org and author resolved.
    Authorized,
    /// Comment written to the store.
    Persisted,
    /// Recipients computed and handed to the dispatcher.
    Notified,
    /// Something failed to resolve. Terminal.
    Denied,
}

impl CreationState {
    /// Returns true if moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: CreationState) -> bool {
        use CreationState::*;
        matches!(
            (self, next),
            (Pending, Authorized)
                | (Pending, Denied)
                | (Authorized, Persisted)
                | (Persisted, Notified)
        )
    }

    /// Returns true if no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, CreationState::Notified | CreationState::Denied)
    }
}

/// Storage for threads and their comments.
pub trait ThreadStore {
    /// Looks up a thread.
    fn thread(&self, id: ThreadId) -> std::result::Result<Resolution<Thread>, LookupError>;

    /// Looks up an org repo.
    fn org_repo(&self, id: OrgRepoId) -> std::result::Result<Resolution<OrgRepo>, LookupError>;

    /// Looks up an org.
    fn org(&self, id: OrgId) -> std::result::Result<Resolution<Org>, LookupError>;

    /// Appends a comment to its thread and returns the stored comment.
    fn create_comment(&self, comment: NewComment) -> std::result::Result<Comment, LookupError>;

    /// Returns the comments of a thread, oldest first.
    fn comments(&self, thread: ThreadId) -> std::result::Result<Vec<Comment>, LookupError>;
}

impl<S: ThreadStore + ?Sized> ThreadStore for &S {
    fn thread(&self, id: ThreadId) -> std::result::Result<Resolution<Thread>, LookupError> {
        (**self).thread(id)
    }

    fn org_repo(&self, id: OrgRepoId) -> std::result::Result<Resolution<OrgRepo>, LookupError> {
        (**self).org_repo(id)
    }

    fn org(&self, id: OrgId) -> std::result::Result<Resolution<Org>, LookupError> {
        (**self).org(id)
    }

    fn create_comment(&self, comment: NewComment) -> std::result::Result<Comment, LookupError> {
        (**self).create_comment(comment)
    }

    fn comments(&self, thread: ThreadId) -> std::result::Result<Vec<Comment>, LookupError> {
        (**self).comments(thread)
    }
}

/// Hands a notification off for delivery.
pub trait Dispatcher {
    /// Delivers `message` to every address in `recipients`.
    ///
    /// Implementations report failures as [`NotifyError::Dispatch`].
    fn dispatch(&self, message: &NotificationMessage, recipients: &NotificationSet) -> Result<()>;
}

/// A successfully created comment and who was told about it.
#[derive(Debug, Clone)]
pub struct CommentCreated {
    pub comment: Comment,
    pub recipients: NotificationSet,
    /// `Notified`, or `Persisted` if notification failed after storing.
    pub state: CreationState,
}

impl CommentCreated {
    /// Returns true if recipients were computed and dispatched.
    pub fn is_notified(&self) -> bool {
        self.state == CreationState::Notified
    }
}

/// Everything resolved during authorization.
struct Authorized {
    thread: Thread,
    repo: OrgRepo,
    org: Org,
    author: User,
    author_email: String,
}

/// Creates comments and notifies the people involved.
pub struct CommentService<S, D, P> {
    store: S,
    resolver: RecipientResolver<D>,
    dispatcher: P,
}

impl<S, D, P> CommentService<S, D, P>
where
    S: ThreadStore,
    D: Directory,
    P: Dispatcher,
{
    /// Creates a new service.
    pub fn new(store: S, resolver: RecipientResolver<D>, dispatcher: P) -> Self {
        Self {
            store,
            resolver,
            dispatcher,
        }
    }

    /// Posts `contents` to a thread on behalf of `author_id`.
    ///
    /// Once the comment is stored the call succeeds. If recipients could not
    /// be computed or dispatched, the result has state
    /// [`CreationState::Persisted`] and an empty recipient set.
    ///
    /// # Errors
    /// - [`NotifyError::AccessDenied`], [`NotifyError::UserNotFound`] or
    ///   [`NotifyError::EmailNotFound`] if authorization fails; nothing is stored
    /// - [`NotifyError::Lookup`] if the store fails before the comment is stored
    pub fn add_comment(
        &self,
        thread_id: ThreadId,
        author_id: UserId,
        contents: &str,
    ) -> Result<CommentCreated> {
        let mut state = CreationState::Pending;

        let auth = match self.authorize(thread_id, author_id) {
            Ok(auth) => auth,
            Err(e) => {
                advance(&mut state, CreationState::Denied);
                warn!(thread_id = %thread_id, author_id = %author_id, error = %e, "Comment denied");
                return Err(e);
            }
        };
        advance(&mut state, CreationState::Authorized);

        let comment = self.store.create_comment(NewComment::new(
            auth.thread.id,
            auth.author.id,
            auth.author_email.clone(),
            contents,
        ))?;
        advance(&mut state, CreationState::Persisted);

        // Stored: from here on failures are logged, not returned.
        let recipients = match self.notify(&auth, &comment) {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(
                    comment_id = %comment.id,
                    thread_id = %comment.thread_id,
                    error = %e,
                    "Comment stored but notification failed"
                );
                return Ok(CommentCreated {
                    comment,
                    recipients: NotificationSet::new(),
                    state,
                });
            }
        };
        advance(&mut state, CreationState::Notified);

        info!(
            comment_id = %comment.id,
            thread_id = %comment.thread_id,
            recipients = recipients.len(),
            "Comment created"
        );
        Ok(CommentCreated {
            comment,
            recipients,
            state,
        })
    }

    /// Computes recipients for a stored comment and hands them to the dispatcher.
    fn notify(&self, auth: &Authorized, comment: &Comment) -> Result<NotificationSet> {
        let thread_comments = self.store.comments(auth.thread.id)?;
        let recipients = self
            .resolver
            .emails_to_notify(&thread_comments, &auth.author, &auth.org)?;

        if recipients.is_empty() {
            debug!(comment_id = %comment.id, "Nobody to notify");
        } else {
            let message =
                NotificationMessage::for_comment(&auth.repo, &auth.thread, &auth.author, comment);
            self.dispatcher.dispatch(&message, &recipients)?;
        }
        Ok(recipients)
    }

    fn authorize(&self, thread_id: ThreadId, author_id: UserId) -> Result<Authorized> {
        let thread = self
            .store
            .thread(thread_id)?
            .found()
            .ok_or_else(|| NotifyError::thread_denied(thread_id))?;
        let repo = self
            .store
            .org_repo(thread.org_repo_id)?
            .found()
            .ok_or_else(|| NotifyError::repo_denied(thread.org_repo_id))?;
        let org = self
            .store
            .org(repo.org_id)?
            .found()
            .ok_or_else(|| NotifyError::org_denied(repo.org_id))?;

        let directory = self.resolver.directory();
        let author = directory
            .user(author_id)?
            .found()
            .ok_or(NotifyError::UserNotFound(author_id))?;
        let author_email = directory
            .email(author_id)?
            .found()
            .ok_or(NotifyError::EmailNotFound(author_id))?;

        Ok(Authorized {
            thread,
            repo,
            org,
            author,
            author_email,
        })
    }
}

fn advance(state: &mut CreationState, next: CreationState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal transition {:?} -> {:?}",
        state,
        next
    );
    debug!(from = ?state, to = ?next, "Comment creation state");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeSet;
    use threadnote_models::CommentId;

    struct Users;

    impl Directory for Users {
        fn user(&self, id: UserId) -> std::result::Result<Resolution<User>, LookupError> {
            Ok(match id.get() {
                1 => Resolution::Found(User::new(1, "alice")),
                2 => Resolution::Found(User::new(2, "bob")),
                3 => Resolution::Found(User::new(3, "mallory")),
                _ => Resolution::NotFound,
            })
        }

        fn email(&self, id: UserId) -> std::result::Result<Resolution<String>, LookupError> {
            Ok(match id.get() {
                1 => Resolution::Found("alice@acme.com".into()),
                2 => Resolution::Found("bob@acme.com".into()),
                _ => Resolution::NotFound,
            })
        }

        fn org_members(
            &self,
            _org: OrgId,
            _ids: &BTreeSet<UserId>,
            usernames: &BTreeSet<String>,
        ) -> std::result::Result<Vec<User>, LookupError> {
            Ok([User::new(1, "alice"), User::new(2, "bob")]
                .into_iter()
                .filter(|u| usernames.contains(&u.username))
                .collect())
        }

        fn all_org_emails(
            &self,
            _org: OrgId,
            _exclude: &BTreeSet<UserId>,
        ) -> std::result::Result<Vec<String>, LookupError> {
            Ok(Vec::new())
        }
    }

    /// One thread (1) in repo 1 of org 42. `repo_missing` hides the repo.
    #[derive(Default)]
    struct Threads {
        repo_missing: bool,
        comments: RefCell<Vec<Comment>>,
    }

    impl ThreadStore for Threads {
        fn thread(&self, id: ThreadId) -> std::result::Result<Resolution<Thread>, LookupError> {
            Ok(if id.get() == 1 {
                Resolution::Found(Thread {
                    id,
                    org_repo_id: OrgRepoId::new(1),
                    repo_revision_path: "foo.go".into(),
                    repo_revision: "1234".into(),
                    start_line: 1,
                    end_line: 2,
                })
            } else {
                Resolution::NotFound
            })
        }

        fn org_repo(&self, id: OrgRepoId) -> std::result::Result<Resolution<OrgRepo>, LookupError> {
            if self.repo_missing {
                return Ok(Resolution::NotFound);
            }
            Ok(Resolution::Found(OrgRepo {
                id,
                org_id: OrgId::new(42),
                canonical_remote_id: "github.com/foo/bar".into(),
            }))
        }

        fn org(&self, id: OrgId) -> std::result::Result<Resolution<Org>, LookupError> {
            Ok(Resolution::Found(Org::new(id, "acme")))
        }

        fn create_comment(&self, comment: NewComment) -> std::result::Result<Comment, LookupError> {
            let mut comments = self.comments.borrow_mut();
            let stored = comment.into_comment(CommentId::new(comments.len() as i32 + 1));
            comments.push(stored.clone());
            Ok(stored)
        }

        fn comments(&self, thread: ThreadId) -> std::result::Result<Vec<Comment>, LookupError> {
            Ok(self
                .comments
                .borrow()
                .iter()
                .filter(|c| c.thread_id == thread)
                .cloned()
                .collect())
        }
    }

    /// Knows the same users as `Users` but cannot list org members.
    struct BrokenRoster;

    impl Directory for BrokenRoster {
        fn user(&self, id: UserId) -> std::result::Result<Resolution<User>, LookupError> {
            Users.user(id)
        }

        fn email(&self, id: UserId) -> std::result::Result<Resolution<String>, LookupError> {
            Users.email(id)
        }

        fn org_members(
            &self,
            _org: OrgId,
            _ids: &BTreeSet<UserId>,
            _usernames: &BTreeSet<String>,
        ) -> std::result::Result<Vec<User>, LookupError> {
            Err(LookupError::Unavailable("directory offline".into()))
        }

        fn all_org_emails(
            &self,
            _org: OrgId,
            _exclude: &BTreeSet<UserId>,
        ) -> std::result::Result<Vec<String>, LookupError> {
            Err(LookupError::Unavailable("directory offline".into()))
        }
    }

    struct Bounce;

    impl Dispatcher for Bounce {
        fn dispatch(&self, _: &NotificationMessage, _: &NotificationSet) -> Result<()> {
            Err(NotifyError::Dispatch("mail relay refused".into()))
        }
    }

    #[derive(Default)]
    struct Outbox {
        sent: RefCell<Vec<(NotificationMessage, Vec<String>)>>,
        calls: Cell<usize>,
    }

    impl Dispatcher for &Outbox {
        fn dispatch(&self, message: &NotificationMessage, recipients: &NotificationSet) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            self.sent
                .borrow_mut()
                .push((message.clone(), recipients.as_slice().to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_transitions() {
        use CreationState::*;
        assert!(Pending.can_transition_to(Authorized));
        assert!(Pending.can_transition_to(Denied));
        assert!(Authorized.can_transition_to(Persisted));
        assert!(Persisted.can_transition_to(Notified));

        assert!(!Pending.can_transition_to(Persisted));
        assert!(!Authorized.can_transition_to(Denied));
        assert!(!Denied.can_transition_to(Authorized));
        assert!(!Notified.can_transition_to(Pending));

        assert!(Denied.is_terminal());
        assert!(Notified.is_terminal());
        assert!(!Persisted.is_terminal());
    }

    #[test]
    fn test_create_and_notify() {
        let store = Threads::default();
        let outbox = Outbox::default();
        let service = CommentService::new(&store, RecipientResolver::new(Users), &outbox);

        service.add_comment(ThreadId::new(1), UserId::new(2), "first").unwrap();
        let created = service
            .add_comment(ThreadId::new(1), UserId::new(1), "Hello @bob")
            .unwrap();

        assert_eq!(created.state, CreationState::Notified);
        assert_eq!(created.comment.author_email, "alice@acme.com");
        assert_eq!(created.recipients.into_vec(), vec!["bob@acme.com"]);

        let sent = outbox.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.subject, "[foo/bar] alice commented on foo.go");
        assert_eq!(sent[0].1, vec!["bob@acme.com"]);
    }

    #[test]
    fn test_no_dispatch_without_recipients() {
        let store = Threads::default();
        let outbox = Outbox::default();
        let service = CommentService::new(&store, RecipientResolver::new(Users), &outbox);

        let created = service
            .add_comment(ThreadId::new(1), UserId::new(1), "talking to myself")
            .unwrap();

        assert!(created.recipients.is_empty());
        assert_eq!(created.state, CreationState::Notified);
        assert_eq!(outbox.calls.get(), 0);
    }

    #[test]
    fn test_missing_repo_is_denied() {
        let store = Threads {
            repo_missing: true,
            ..Default::default()
        };
        let outbox = Outbox::default();
        let service = CommentService::new(&store, RecipientResolver::new(Users), &outbox);

        let err = service
            .add_comment(ThreadId::new(1), UserId::new(1), "Hello")
            .unwrap_err();

        assert!(err.is_denied());
        assert!(store.comments.borrow().is_empty());
        assert_eq!(outbox.calls.get(), 0);
    }

    #[test]
    fn test_missing_thread_is_denied() {
        let store = Threads::default();
        let outbox = Outbox::default();
        let service = CommentService::new(&store, RecipientResolver::new(Users), &outbox);

        let err = service
            .add_comment(ThreadId::new(99), UserId::new(1), "Hello")
            .unwrap_err();

        assert_eq!(err.to_string(), "access denied: thread 99 not found");
        assert!(store.comments.borrow().is_empty());
    }

    #[test]
    fn test_author_without_email_is_rejected() {
        let store = Threads::default();
        let outbox = Outbox::default();
        let service = CommentService::new(&store, RecipientResolver::new(Users), &outbox);

        let err = service
            .add_comment(ThreadId::new(1), UserId::new(3), "Hello")
            .unwrap_err();

        assert!(matches!(err, NotifyError::EmailNotFound(id) if id == UserId::new(3)));
        assert!(store.comments.borrow().is_empty());
    }

    #[test]
    fn test_lookup_failure_after_store_keeps_comment() {
        let store = Threads::default();
        let outbox = Outbox::default();
        let service = CommentService::new(&store, RecipientResolver::new(BrokenRoster), &outbox);

        let created = service
            .add_comment(ThreadId::new(1), UserId::new(1), "hi @bob")
            .unwrap();

        assert_eq!(created.state, CreationState::Persisted);
        assert!(!created.is_notified());
        assert!(created.recipients.is_empty());
        assert_eq!(store.comments.borrow().len(), 1);
        assert_eq!(store.comments.borrow()[0].id, created.comment.id);
        assert_eq!(outbox.calls.get(), 0);
    }

    #[test]
    fn test_dispatch_failure_keeps_comment() {
        let store = Threads::default();
        let service = CommentService::new(&store, RecipientResolver::new(Users), Bounce);

        service.add_comment(ThreadId::new(1), UserId::new(2), "first").unwrap();
        let created = service
            .add_comment(ThreadId::new(1), UserId::new(1), "Hello @bob")
            .unwrap();

        assert_eq!(created.state, CreationState::Persisted);
        assert_eq!(created.comment.contents, "Hello @bob");
        assert_eq!(store.comments.borrow().len(), 2);
    }
}
