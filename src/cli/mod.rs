//! CLI command handlers
//!
//! Bridges the clap argument parsing in `main.rs` with the service layer.

pub mod params;
pub mod token;

pub use params::{handle_changelog, handle_import, handle_row, handle_update, parse_assignment, UpdateArgs};
pub use token::{handle_token_command, TokenCommands};
