mod app;
mod cli;
mod config;
mod effects;
mod input;
mod logging;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use benchdesk_logging::desk_info;
use clap::Parser;

use crate::cli::Cli;
use crate::config::AppConfig;

const DEFAULT_CONFIG: &str = "benchdesk.ron";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("could not load configuration from {config_path:?}"))?;
    config.apply_cli(&cli);

    logging::initialize(config.log, config.log_level, &config.log_file);
    desk_info!("benchdesk starting against {}", config.base_url);

    app::run(&config, cli.command)
}
