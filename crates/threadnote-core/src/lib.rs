//! threadnote core - mention scanning and notification fan-out.
//!
//! Given a comment thread and a newly posted comment, this crate determines
//! the ordered, deduplicated list of email addresses to notify:
//!
//! - **mention**: extract `@name` tokens from comment bodies
//! - **recipients**: insertion-ordered set of email addresses
//! - **directory**: lookups the caller provides (users, emails, org roster)
//! - **notify**: the three-pass fan-out over participants and mentions
//! - **comments**: access-guarded comment creation that drives the fan-out
//! - **message**: the notification subject and body
//! - **config**: fan-out options and state directory locations

pub mod comments;
pub mod config;
pub mod directory;
pub mod error;
pub mod mention;
pub mod message;
pub mod notify;
pub mod recipients;

pub use comments::{CommentCreated, CommentService, CreationState, Dispatcher, ThreadStore};
pub use config::NotifyConfig;
pub use directory::{Directory, Resolution};
pub use error::{LookupError, NotifyError, Result};
pub use mention::{scan_mentions, Mention};
pub use message::{repo_name_from_remote_id, NotificationMessage};
pub use notify::{emails_to_notify, RecipientResolver};
pub use recipients::NotificationSet;
