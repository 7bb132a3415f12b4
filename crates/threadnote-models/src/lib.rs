//! Core data models for threadnote.
//!
//! This crate provides the fundamental data types shared by the mention
//! scanner, the recipient resolver and the stores: typed ids, users and
//! their emails, orgs and their repositories, threads and comments.

pub mod comment;
pub mod ids;
pub mod org;
pub mod user;

// Re-export main types
pub use comment::{Comment, NewComment, Thread};
pub use ids::{CommentId, OrgId, OrgRepoId, ThreadId, UserId};
pub use org::{Org, OrgMember, OrgRepo};
pub use user::{User, UserEmail};
