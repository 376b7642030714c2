use std::path::PathBuf;

use anyhow::Context;
use uploadq_app::config::{AppConfig, ACCESS_TOKEN_ENV, DEFAULT_CONFIG_PATH};
use uploadq_app::{app, logging};
use uploadq_logging::uploadq_info;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config =
        AppConfig::load(&config_path)?.with_access_token(std::env::var(ACCESS_TOKEN_ENV).ok());

    logging::initialize(config.log_destination);
    uploadq_info!(
        "Loaded config for device {} from {:?}",
        config.device_id,
        config_path
    );

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(app::run(config))
}
