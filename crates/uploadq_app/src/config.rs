use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use uploadq_core::{PathDecoder, PRIORITY_UPLOAD_HOST};
use uploadq_engine::{
    ApiSettings, EngineConfig, DEFAULT_OFFLINE_INTERVAL, DEFAULT_ONLINE_INTERVAL,
};

use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "uploadq.ron";
/// Overrides `access_token` so the token can stay out of the config file.
pub const ACCESS_TOKEN_ENV: &str = "UPLOADQ_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub device_id: String,
    pub athena_url: String,
    pub api_url: String,
    pub access_token: Option<String>,
    pub priority_host: String,
    pub online_interval_ms: u64,
    pub offline_interval_ms: u64,
    pub log_destination: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        Self {
            device_id: String::new(),
            athena_url: api.athena_url,
            api_url: api.api_url,
            access_token: None,
            priority_host: PRIORITY_UPLOAD_HOST.to_string(),
            online_interval_ms: DEFAULT_ONLINE_INTERVAL.as_millis() as u64,
            offline_interval_ms: DEFAULT_OFFLINE_INTERVAL.as_millis() as u64,
            log_destination: LogDestination::default(),
        }
    }
}

impl AppConfig {
    /// Reads a RON config. A missing file yields the defaults, which still
    /// need a device id to pass validation.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config = match fs::read_to_string(path) {
            Ok(text) => ron::from_str::<AppConfig>(&text)
                .with_context(|| format!("parsing config {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => AppConfig::default(),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_access_token(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
            self.access_token = Some(token.trim().to_string());
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.device_id.trim().is_empty() {
            bail!("config is missing a device_id");
        }
        if self.online_interval_ms == 0 || self.offline_interval_ms == 0 {
            bail!("poll intervals must be greater than zero");
        }
        if self.priority_host.trim().is_empty() {
            bail!("priority_host must not be empty");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            device_id: self.device_id.trim().to_string(),
            online_interval: Duration::from_millis(self.online_interval_ms),
            offline_interval: Duration::from_millis(self.offline_interval_ms),
            decoder: PathDecoder::with_priority_host(&self.priority_host),
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            athena_url: self.athena_url.clone(),
            api_url: self.api_url.clone(),
            access_token: self.access_token.clone(),
            ..ApiSettings::default()
        }
    }
}
