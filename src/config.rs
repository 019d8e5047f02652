use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::time::Duration;
use tracing::info;

use crate::error::VwapError;

/// Default location of the config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_PATH_ENV: &str = "VWAP_CONFIG";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com/v8/finance/chart".to_string(),
            connect_timeout_secs: 30,
            read_timeout_secs: 30,
            write_timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Overall deadline for one request. reqwest has no separate write
    /// timeout, so the write budget is folded in here.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs + self.read_timeout_secs + self.write_timeout_secs,
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct VwapConfig {
    // Ticker requested from the chart endpoint, e.g. "DDOG".
    pub symbol: String,

    pub years_of_history: u32,
    pub interval: String,

    // IANA zone used for month bucketing. None or "local" means system local time.
    pub timezone: Option<String>,

    pub http: HttpConfig,
}

impl Default for VwapConfig {
    fn default() -> Self {
        Self {
            symbol: "DDOG".to_string(),
            years_of_history: 5,
            interval: "1d".to_string(),
            timezone: None,
            http: HttpConfig::default(),
        }
    }
}

impl VwapConfig {
    /// Loads configuration from `$VWAP_CONFIG`, or `config.yaml` in the current
    /// working directory. A missing file falls back to the built-in defaults.
    pub fn load() -> Result<Self, VwapError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, VwapError> {
        match fs::read_to_string(path) {
            Ok(yaml_content) => Self::from_yaml_str(&yaml_content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config file at {}, using defaults.", path);
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_yaml_str(yaml_content: &str) -> Result<Self, VwapError> {
        let config: VwapConfig = serde_yaml::from_str(yaml_content)
            .map_err(|e| VwapError::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), VwapError> {
        if self.symbol.trim().is_empty() {
            return Err(VwapError::Config("symbol is empty".into()));
        }
        if self.years_of_history == 0 {
            return Err(VwapError::Config("years_of_history must be at least 1".into()));
        }
        self.time_zone()?;
        Ok(())
    }

    /// Resolves the configured bucketing zone. `Ok(None)` means system local time.
    pub fn time_zone(&self) -> Result<Option<Tz>, VwapError> {
        match self.timezone.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) if name.eq_ignore_ascii_case("local") => Ok(None),
            Some(name) => name
                .parse::<Tz>()
                .map(Some)
                .map_err(|e| VwapError::Config(format!("unknown timezone '{}': {}", name, e))),
        }
    }
}
