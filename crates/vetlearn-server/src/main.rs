//! VetLearn Server - Main entry point

use anyhow::Result;
use tracing::info;
use vetlearn_common::logging::{init_logging, LogConfig};
use vetlearn_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("vetlearn-server".to_string())
        .filter_directives("vetlearn_server=debug,tower_http=debug,sqlx=warn".to_string())
        .build();

    // Environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    let _guard = init_logging(&log_config)?;

    info!("Starting VetLearn Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
