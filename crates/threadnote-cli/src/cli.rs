//! Command-line interface definition using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use threadnote_core::{config, NotifyConfig};

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// threadnote - work out who hears about a new code comment
#[derive(Parser, Debug)]
#[command(name = "threadnote")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the snapshot file
    #[arg(short, long, env = "THREADNOTE_SNAPSHOT", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Extra handle that notifies the whole org (repeatable)
    #[arg(long = "broadcast-alias", value_name = "HANDLE", global = true)]
    pub broadcast_aliases: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the mentions found in a piece of text
    Scan {
        /// Text to scan
        #[arg(required = true)]
        text: String,
    },

    /// Show who would be notified about the latest comment of a thread
    Recipients {
        /// Thread ID
        #[arg(required = true)]
        thread: i32,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Post a comment and notify everyone involved
    Comment {
        /// Thread ID
        #[arg(required = true)]
        thread: i32,

        /// User ID of the author
        #[arg(short, long)]
        author: i32,

        /// Comment body
        #[arg(required = true)]
        message: String,

        /// Write the new comment back to the snapshot file
        #[arg(long)]
        save: bool,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

/// Output format for recipient lists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Cli {
    /// Returns the snapshot path, using the default if not specified.
    ///
    /// A leading `~` is expanded to the home directory.
    pub fn snapshot_path(&self) -> PathBuf {
        match &self.snapshot {
            Some(path) => {
                let raw = path.to_string_lossy();
                PathBuf::from(shellexpand::tilde(&raw).into_owned())
            }
            None => config::snapshot_file(),
        }
    }

    /// Returns the fan-out config: aliases from the environment plus any
    /// given on the command line.
    pub fn notify_config(&self) -> NotifyConfig {
        NotifyConfig::from_env().with_broadcast_aliases(self.broadcast_aliases.iter().map(String::as_str))
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
