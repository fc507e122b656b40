//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vellum - content storage with media-type resolution and renditions
#[derive(Parser, Debug)]
#[command(name = "vellum")]
#[command(about = "Content storage with media-type resolution and renditions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file; defaults to the bundled, home and working-directory files
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Store to operate on
    #[arg(short, long, global = true, default_value = "blobs")]
    pub store: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a file and print its content id
    Put {
        /// File to store
        file: PathBuf,

        /// Replace the content stored under this id instead of generating one
        #[arg(long)]
        id: Option<String>,
    },

    /// Write stored content to a file or stdout
    Get {
        /// Content id
        id: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete stored content
    Delete {
        /// Content id
        id: String,
    },

    /// Report whether content is stored under an id
    Exists {
        /// Content id
        id: String,
    },

    /// Resolve stored content against an Accept list, rendering if needed
    Resolve {
        /// Content id
        id: String,

        /// Media type the content was stored as
        #[arg(long)]
        media_type: String,

        /// Acceptable media types, as in an HTTP Accept header
        #[arg(long, default_value = "*/*")]
        accept: String,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List configured stores
    Stores,
}
