//! Snapshot-backed store for threadnote.
//!
//! This crate provides an in-memory store of users, orgs, threads and
//! comments that implements the lookups the fan-out needs. The data is loaded
//! from a JSON snapshot and can be written back with atomic file operations
//! (write to temp file, then rename).
//!
//! # Example
//!
//! ```no_run
//! use threadnote_core::{CommentService, RecipientResolver};
//! use threadnote_models::{ThreadId, UserId};
//! use threadnote_store::{LogDispatcher, MemoryStore};
//!
//! let store = MemoryStore::load("/tmp/threadnote/snapshot.json").unwrap();
//! let service = CommentService::new(&store, RecipientResolver::new(&store), LogDispatcher);
//!
//! let created = service
//!     .add_comment(ThreadId::new(1), UserId::new(1), "Ping @renfred")
//!     .unwrap();
//! println!("notified {} people", created.recipients.len());
//!
//! store.save("/tmp/threadnote/snapshot.json").unwrap();
//! ```

pub mod atomic;
pub mod dispatch;
pub mod error;
pub mod memory;
pub mod snapshot;

pub use dispatch::LogDispatcher;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use snapshot::Snapshot;
