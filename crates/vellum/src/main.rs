//! Vellum CLI binary.
//!
//! Stores, fetches and resolves content in the stores named by the configuration:
//! - `put`, `get`, `delete`, `exists` talk to a store's backend directly
//! - `resolve` runs the resolution engine for a declared media type and an Accept list
//! - `stores` lists the configured stores

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, StoreSession, list_stores};

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => vellum::VellumConfig::from_file(path)?,
        None => vellum::VellumConfig::load()?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    vellum::init_logging(&config.logging)?;

    match cli.command {
        Commands::Stores => list_stores(&config),
        Commands::Put { file, id } => {
            StoreSession::open(&config, &cli.store)?
                .put(&file, id.as_deref())
                .await?
        }
        Commands::Get { id, output } => {
            StoreSession::open(&config, &cli.store)?
                .get(&id, output.as_deref())
                .await?
        }
        Commands::Delete { id } => StoreSession::open(&config, &cli.store)?.delete(&id).await?,
        Commands::Exists { id } => StoreSession::open(&config, &cli.store)?.exists(&id).await?,
        Commands::Resolve {
            id,
            media_type,
            accept,
            output,
        } => {
            StoreSession::open(&config, &cli.store)?
                .resolve(&id, &media_type, &accept, output.as_deref())
                .await?
        }
    }

    Ok(())
}
