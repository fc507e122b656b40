//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the vellum binary.

mod commands;
mod store;

pub use commands::{Cli, Commands};
pub use store::{StoreSession, list_stores};
