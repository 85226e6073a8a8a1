//! Cross-exchange market-making bot entrypoint.

mod app;
mod config;
mod error;
mod logging;

use app::Application;
use config::AppConfig;
use error::AppResult;
use std::path::Path;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config_path = AppConfig::resolve_path();
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration from {config_path}: {e}");
            return Err(e);
        }
    };

    logging::init_logging(&config.logging);
    if Path::new(&config_path).exists() {
        info!(path = %config_path, "Configuration loaded");
    } else {
        warn!(path = %config_path, "Config file not found, using built-in paper setup");
    }

    let application = match Application::new(config) {
        Ok(application) => application,
        Err(e) => {
            error!(error = %e, "Failed to build application");
            return Err(e);
        }
    };

    application.run().await
}
