mod sources {
    pub mod spotify;
}
mod assembler;
mod catalog;
mod cli;
mod completion;
mod config;
mod error;
mod extractor;
mod logger;
mod models;
mod payment;
mod prompt;
mod resolver;
mod server;
#[cfg(test)]
mod test_support;

use crate::{
    cli::{Cli, LogConfig},
    config::AppConfig,
    logger::Logger,
    server::AppState,
};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logger = Logger::new(LogConfig::from_cli(&cli));

    // Credentials are optional at startup; routes that need them answer 500
    let config = AppConfig::from_env();
    let state = AppState::new(config, logger).context("Failed to create HTTP client")?;

    server::serve(Arc::new(state), cli.bind_addr()).await
}
