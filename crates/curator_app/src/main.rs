//! `curator`: command-line client for company collections.
mod cli;
mod commands;
mod config;
mod logging;
mod render;

use clap::Parser;

use crate::cli::Cli;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, logging::level_for(cli.verbose));

    let config = AppConfig::load(&cli.config)?.with_server(cli.server.clone());
    commands::run(cli.command, &config, &cli.config).await
}
