//! threadnote CLI entry point.

use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

use threadnote_cli::cli::Cli;
use threadnote_cli::commands;
use threadnote_core::config;

fn main() {
    // Before parsing: clap reads THREADNOTE_* from the environment
    let env_file = config::load_env();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    fmt().with_env_filter(filter).with_target(false).init();

    match env_file {
        Ok(Some(path)) => debug!(path = %path.display(), "Loaded env file"),
        Ok(None) => {}
        Err(e) => warn!(
            path = %config::env_file().display(),
            error = %e,
            "Failed to load env file"
        ),
    }

    if let Err(e) = commands::execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
