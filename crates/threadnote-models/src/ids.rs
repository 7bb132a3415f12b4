//! Type-safe ID wrappers for threadnote.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate integer ID newtypes with common functionality.
macro_rules! define_id {
    ($name:ident, $kind:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates an ID from its raw value.
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            /// Returns the raw value.
            pub const fn get(self) -> i32 {
                self.0
            }

            /// Returns a short name for the kind of record this ID refers to.
            pub const fn kind() -> &'static str {
                $kind
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(UserId, "user");
define_id!(OrgId, "org");
define_id!(OrgRepoId, "org repo");
define_id!(ThreadId, "thread");
define_id!(CommentId, "comment");
