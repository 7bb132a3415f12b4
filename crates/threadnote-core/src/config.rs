//! Configuration for notification fan-out.
//!
//! # Storage Structure
//!
//! Local data lives under `~/.threadnote/`:
//!
//! ```text
//! ~/.threadnote/
//! ├── .env.local       # Environment overrides loaded at startup
//! └── snapshot.json    # Users, orgs, threads and comments
//! ```
//!
//! # Environment Variables
//!
//! - `THREADNOTE_STATE_DIR`: Override the base state directory
//! - `THREADNOTE_SNAPSHOT`: Override the snapshot file
//! - `THREADNOTE_BROADCAST_ALIASES`: Comma separated extra broadcast handles

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::mention::Mention;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "THREADNOTE_STATE_DIR";

/// Environment variable for the snapshot file.
pub const SNAPSHOT_ENV: &str = "THREADNOTE_SNAPSHOT";

/// Environment variable for extra broadcast handles.
pub const BROADCAST_ALIASES_ENV: &str = "THREADNOTE_BROADCAST_ALIASES";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".threadnote";

const SNAPSHOT_FILE: &str = "snapshot.json";
const ENV_FILE: &str = ".env.local";

/// Get the threadnote state directory.
///
/// The state directory is determined by:
/// 1. `THREADNOTE_STATE_DIR` environment variable if set
/// 2. `~/.threadnote` if home directory is available
/// 3. `.threadnote` in current directory as fallback
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

/// Get the default snapshot file path.
pub fn snapshot_file() -> PathBuf {
    std::env::var(SNAPSHOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| state_dir().join(SNAPSHOT_FILE))
}

/// Get the path to the `.env.local` file.
pub fn env_file() -> PathBuf {
    state_dir().join(ENV_FILE)
}

/// Load `.env.local` from the state directory into the environment, if present.
///
/// Returns the path that was loaded, or `None` if there is no env file. Runs
/// before logging is set up, so failures are returned for the caller to report.
pub fn load_env() -> Result<Option<PathBuf>, dotenvy::Error> {
    load_env_from(&env_file())
}

/// Load an env file into the environment, if it exists.
///
/// Variables already set in the environment are left untouched.
pub fn load_env_from(path: &Path) -> Result<Option<PathBuf>, dotenvy::Error> {
    if !path.exists() {
        return Ok(None);
    }
    dotenvy::from_path(path)?;
    Ok(Some(path.to_path_buf()))
}

/// Options for the recipient resolver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifyConfig {
    /// Handles that broadcast to the whole org in addition to the org's own
    /// name, e.g. `org` or `everyone`.
    pub broadcast_aliases: Vec<String>,
}

impl NotifyConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads options from the environment.
    pub fn from_env() -> Self {
        let aliases = std::env::var(BROADCAST_ALIASES_ENV).unwrap_or_default();
        Self::new().with_broadcast_aliases(aliases.split(','))
    }

    /// Adds a broadcast alias.
    ///
    /// Aliases that could never be produced by the mention scanner are
    /// ignored with a warning.
    pub fn with_broadcast_alias(mut self, alias: &str) -> Self {
        let alias = alias.trim();
        if alias.is_empty() {
            return self;
        }
        match Mention::parse(alias) {
            Some(mention) => {
                let alias = mention.into_string();
                if !self.broadcast_aliases.contains(&alias) {
                    self.broadcast_aliases.push(alias);
                }
            }
            None => warn!(alias, "Ignoring broadcast alias that is not a valid handle"),
        }
        self
    }

    /// Adds several broadcast aliases.
    pub fn with_broadcast_aliases<'a>(self, aliases: impl IntoIterator<Item = &'a str>) -> Self {
        aliases
            .into_iter()
            .fold(self, |config, alias| config.with_broadcast_alias(alias))
    }

    /// Returns true if `handle` broadcasts to the org named `org_name`.
    ///
    /// The org name matches exactly as stored.
    pub fn is_broadcast(&self, handle: &str, org_name: &str) -> bool {
        handle == org_name || self.broadcast_aliases.iter().any(|a| a == handle)
    }
}
