//! threadnote CLI library.
//!
//! Command-line access to the mention scanner and the notification fan-out,
//! run against a snapshot file.

pub mod cli;
pub mod commands;
