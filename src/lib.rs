pub mod cli;
pub mod core;
pub mod providers;

use crate::core::Converter;
use crate::core::config::AppConfig;
use crate::providers::ApiLayerProvider;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert(Vec<String>),
    Interactive,
}

/// Builds the converter described by `config`.
pub fn build_converter(config: &AppConfig) -> Result<Converter> {
    let api_key = config.api_key()?;
    let provider = ApiLayerProvider::from_config(&config.providers.apilayer, &api_key)?;
    Ok(Converter::new(
        Arc::new(provider),
        config.pair(),
        config.default_amount(),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(pair = %config.pair(), base_url = %config.providers.apilayer.base_url, "Loaded config");

    let converter = build_converter(&config)?;

    match command {
        AppCommand::Convert(amounts) => cli::convert::run(&converter, &amounts).await,
        AppCommand::Interactive => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            cli::interactive::run(&converter, stdin, &mut std::io::stdout()).await
        }
    }
}
