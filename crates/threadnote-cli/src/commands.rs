//! Command handlers for CLI subcommands.

use std::path::Path;

use threadnote_core::{
    scan_mentions, CommentCreated, CommentService, Directory, NotificationSet, NotifyConfig,
    RecipientResolver, Resolution, ThreadStore,
};
use threadnote_models::{Org, ThreadId, UserId};
use threadnote_store::{LogDispatcher, MemoryStore};
use tracing::info;

use crate::cli::{Cli, Commands, OutputFormat};

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Execute a CLI command.
pub fn execute(cli: Cli) -> Result<()> {
    let snapshot = cli.snapshot_path();
    let config = cli.notify_config();

    match cli.command {
        Commands::Scan { text } => {
            for mention in scan_mentions(&text) {
                println!("{}", mention);
            }
            Ok(())
        }
        Commands::Recipients { thread, format } => {
            let store = open_store(&snapshot)?;
            let recipients = cmd_recipients(&store, config, ThreadId::new(thread))?;
            print!("{}", render_recipients(&recipients, format)?);
            Ok(())
        }
        Commands::Comment {
            thread,
            author,
            message,
            save,
            format,
        } => {
            let store = open_store(&snapshot)?;
            let created = cmd_comment(
                &store,
                config,
                ThreadId::new(thread),
                UserId::new(author),
                &message,
            )?;
            if created.is_notified() {
                print!("{}", render_recipients(&created.recipients, format)?);
            } else {
                eprintln!(
                    "Warning: comment {} was stored but notifications failed (run with -v for details)",
                    created.comment.id
                );
            }
            if save {
                store.save(&snapshot)?;
                println!("Saved snapshot to {}", snapshot.display());
            }
            Ok(())
        }
    }
}

/// Recomputes who was notified about the latest comment on a thread.
pub fn cmd_recipients(
    store: &MemoryStore,
    config: NotifyConfig,
    thread_id: ThreadId,
) -> Result<NotificationSet> {
    let org = thread_org(store, thread_id)?;
    let comments = store.comments(thread_id)?;
    let latest = comments
        .last()
        .ok_or_else(|| format!("Thread {} has no comments", thread_id))?;
    let author = store
        .user(latest.author_user_id)?
        .found()
        .ok_or_else(|| format!("Unknown author: {}", latest.author_user_id))?;

    let resolver = RecipientResolver::new(store).with_config(config);
    Ok(resolver.emails_to_notify(&comments, &author, &org)?)
}

/// Posts a comment and reports who it was dispatched to.
pub fn cmd_comment(
    store: &MemoryStore,
    config: NotifyConfig,
    thread_id: ThreadId,
    author_id: UserId,
    message: &str,
) -> Result<CommentCreated> {
    let resolver = RecipientResolver::new(store).with_config(config);
    let service = CommentService::new(store, resolver, LogDispatcher);
    let created = service.add_comment(thread_id, author_id, message)?;

    info!(comment_id = %created.comment.id, state = ?created.state, "Posted comment");
    Ok(created)
}

fn thread_org(store: &MemoryStore, thread_id: ThreadId) -> Result<Org> {
    let Resolution::Found(thread) = store.thread(thread_id)? else {
        return Err(format!("Thread not found: {}", thread_id).into());
    };
    let repo = store
        .org_repo(thread.org_repo_id)?
        .found()
        .ok_or_else(|| format!("Repository not found: {}", thread.org_repo_id))?;
    let org = store
        .org(repo.org_id)?
        .found()
        .ok_or_else(|| format!("Org not found: {}", repo.org_id))?;
    Ok(org)
}

/// Formats a recipient list for printing.
pub fn render_recipients(recipients: &NotificationSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(recipients)?)),
        OutputFormat::Table => {
            if recipients.is_empty() {
                return Ok("Nobody to notify.\n".to_string());
            }
            let mut out = format!("{:<4} EMAIL\n", "#");
            out.push_str(&format!("{}\n", "-".repeat(40)));
            for (i, email) in recipients.iter().enumerate() {
                out.push_str(&format!("{:<4} {}\n", i + 1, email));
            }
            Ok(out)
        }
    }
}

/// Loads a snapshot file, for callers that only need the store.
pub fn open_store(path: &Path) -> Result<MemoryStore> {
    Ok(MemoryStore::load(path)?)
}
