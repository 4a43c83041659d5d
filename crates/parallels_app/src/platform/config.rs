use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use log::LevelFilter;
use parallels_core::{CaseSensitivity, CoreConfig, SessionConfig};
use parallels_engine::ClientSettings;
use parallels_logging::parallels_info;
use serde::Deserialize;
use url::Url;

use super::logging::LogDestination;

pub(crate) const DEFAULT_CONFIG_PATH: &str = "./parallels.ron";
pub(crate) const API_URL_ENV: &str = "PARALLELS_API_URL";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionSection,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct ApiConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_response_bytes: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api/".to_string(),
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SessionSection {
    pub max_concurrent_requests: usize,
    pub default_page_size: usize,
    pub poll_interval_ms: u64,
    pub retry_interval_ms: u64,
    pub case_insensitive_sort: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        let core = CoreConfig::default();
        Self {
            max_concurrent_requests: core.max_concurrent_requests,
            default_page_size: core.session.default_page_size,
            poll_interval_ms: millis(core.session.poll_interval),
            retry_interval_ms: millis(core.session.retry_interval),
            case_insensitive_sort: core.case == CaseSensitivity::Insensitive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct LogConfig {
    pub destination: LogDestination,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            destination: LogDestination::Terminal,
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Reads `path`, or the default location when none is given. Only a
    /// missing default file falls back to built-in defaults.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.log_level()?;
        Ok(config)
    }

    pub(crate) fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            parallels_info!("Using API url from {}", API_URL_ENV);
            self.api.base_url = url.trim().to_string();
        }
        self
    }

    pub(crate) fn log_level(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(&self.log.level)
            .with_context(|| format!("unknown log level `{}`", self.log.level))
    }

    pub(crate) fn core_config(&self) -> CoreConfig {
        let session = &self.session;
        CoreConfig {
            max_concurrent_requests: session.max_concurrent_requests,
            session: SessionConfig {
                poll_interval: Duration::from_millis(session.poll_interval_ms),
                retry_interval: Duration::from_millis(session.retry_interval_ms),
                default_page_size: session.default_page_size,
            },
            case: if session.case_insensitive_sort {
                CaseSensitivity::Insensitive
            } else {
                CaseSensitivity::Sensitive
            },
            ..CoreConfig::default()
        }
    }

    pub(crate) fn client_settings(&self) -> Result<ClientSettings> {
        let base_url = Url::parse(&self.api.base_url)
            .with_context(|| format!("invalid API base url `{}`", self.api.base_url))?;
        let mut settings = ClientSettings::new(base_url);
        settings.connect_timeout = Duration::from_millis(self.api.connect_timeout_ms);
        settings.request_timeout = Duration::from_millis(self.api.request_timeout_ms);
        settings.max_response_bytes = self.api.max_response_bytes;
        Ok(settings)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
