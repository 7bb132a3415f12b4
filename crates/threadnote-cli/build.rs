//! Stamps `GIT_HASH` and `BUILD_DATE` into the `threadnote` binary.
//!
//! Builds from a source tarball have no `.git`, so both values can be pinned:
//! `THREADNOTE_BUILD_REV` replaces the git revision and `SOURCE_DATE_EPOCH`
//! (seconds since the epoch) replaces the current date.

use std::env;
use std::process::Command;

const REV_OVERRIDE: &str = "THREADNOTE_BUILD_REV";
const DATE_OVERRIDE: &str = "SOURCE_DATE_EPOCH";

fn main() {
    println!("cargo:rustc-env=GIT_HASH={}", revision());
    println!("cargo:rustc-env=BUILD_DATE={}", build_date());

    println!("cargo:rerun-if-env-changed={}", REV_OVERRIDE);
    println!("cargo:rerun-if-env-changed={}", DATE_OVERRIDE);
    println!("cargo:rerun-if-changed=../../.git/HEAD");
}

fn revision() -> String {
    if let Ok(rev) = env::var(REV_OVERRIDE) {
        if !rev.trim().is_empty() {
            return rev.trim().to_string();
        }
    }

    // Marks uncommitted changes with a -dirty suffix
    Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|rev| rev.trim().to_string())
        .filter(|rev| !rev.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn build_date() -> String {
    let pinned = env::var(DATE_OVERRIDE)
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0));

    match pinned {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => chrono::Utc::now().format("%Y-%m-%d").to_string(),
    }
}
