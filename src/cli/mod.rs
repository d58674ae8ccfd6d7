//! Command-line interface for lrc-embed.
//!
//! This module provides CLI commands for batch embedding and for checking
//! that the external tooling is installed.

mod commands;

pub use commands::{Cli, Commands, run_command};
