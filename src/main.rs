//! Memchat - terminal chat client for the memory search backend
//!
//! CLI entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod cli;
mod logging;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    let mut config = settings::load_config()?;
    cli.apply_overrides(&mut config);

    let _log_guard = logging::init(&config.log, cli.is_interactive())?;
    info!("Starting Memchat v{}", env!("CARGO_PKG_VERSION"));

    cli::run(cli, config).await
}
