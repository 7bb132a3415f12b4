//! Notification message for a new comment.

use threadnote_models::{Comment, OrgRepo, Thread, ThreadId, User};

/// Derive a display name from a canonical remote ID by dropping the host.
///
/// # Example
/// ```
/// use threadnote_core::repo_name_from_remote_id;
///
/// assert_eq!(repo_name_from_remote_id("github.com/gorilla/mux"), "gorilla/mux");
/// assert_eq!(repo_name_from_remote_id("company.internal/project"), "project");
/// ```
pub fn repo_name_from_remote_id(remote_id: &str) -> &str {
    match remote_id.split_once('/') {
        Some((_host, rest)) if !rest.is_empty() => rest,
        _ => remote_id,
    }
}

/// What gets sent to each recipient of a new comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub thread_id: ThreadId,
    pub repo_name: String,
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    /// Builds the message for `comment` posted by `author` on `thread`.
    pub fn for_comment(repo: &OrgRepo, thread: &Thread, author: &User, comment: &Comment) -> Self {
        let repo_name = repo_name_from_remote_id(&repo.canonical_remote_id).to_string();
        let subject = format!(
            "[{}] {} commented on {}",
            repo_name, author.username, thread.repo_revision_path
        );

        let mut location = format!(
            "{}:{}-{}",
            thread.repo_revision_path, thread.start_line, thread.end_line
        );
        if !thread.repo_revision.is_empty() {
            location.push_str(" @ ");
            location.push_str(&thread.repo_revision);
        }
        let body = format!("{}\n\n{}", comment.contents, location);

        Self {
            thread_id: thread.id,
            repo_name,
            subject,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadnote_models::{CommentId, NewComment, OrgId, OrgRepoId, UserId};

    #[test]
    fn test_repo_name_from_remote_id() {
        let cases = vec![
            ("github.com/gorilla/mux", "gorilla/mux"),
            ("git.acmeinternal.org/acme/acme", "acme/acme"),
            ("company.internal/project", "project"),
            ("localrepo", "localrepo"),
            ("host/", "host/"),
        ];
        for (input, expected) in cases {
            assert_eq!(repo_name_from_remote_id(input), expected, "Failed for: {}", input);
        }
    }

    #[test]
    fn test_for_comment() {
        let repo = OrgRepo {
            id: OrgRepoId::new(1),
            org_id: OrgId::new(42),
            canonical_remote_id: "github.com/foo/bar".to_string(),
        };
        let thread = Thread {
            id: ThreadId::new(7),
            org_repo_id: repo.id,
            repo_revision_path: "foo.go".to_string(),
            repo_revision: "1234".to_string(),
            start_line: 1,
            end_line: 2,
        };
        let author = User::new(1, "alice");
        let comment = NewComment::new(thread.id, UserId::new(1), "alice@acme.com", "Hello @bob")
            .into_comment(CommentId::new(3));

        let message = NotificationMessage::for_comment(&repo, &thread, &author, &comment);

        assert_eq!(message.thread_id, ThreadId::new(7));
        assert_eq!(message.repo_name, "foo/bar");
        assert_eq!(message.subject, "[foo/bar] alice commented on foo.go");
        assert_eq!(message.body, "Hello @bob\n\nfoo.go:1-2 @ 1234");
    }
}
