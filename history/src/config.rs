//! History engine configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use strand_types::{Network, NetworkDetails};

use crate::error::HistoryError;

/// Configuration for a history session.
///
/// Can be loaded from a TOML file via [`HistoryConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Which network to read history from.
    #[serde(default = "default_network")]
    pub network: Network,

    /// Horizon endpoint override; the network default is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon_url: Option<String>,

    /// Seconds between background refreshes while watching.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Operations requested per Horizon page (Horizon caps this at 200).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pages followed per fetch.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter (e.g. "info", "debug", "strand_history=trace").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_network() -> Network {
    Network::Public
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    200
}

fn default_max_pages() -> u32 {
    1
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl HistoryConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            HistoryError::Config(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, HistoryError> {
        let config: Self = toml::from_str(s).map_err(|e| HistoryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, HistoryError> {
        toml::to_string_pretty(self).map_err(|e| HistoryError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), HistoryError> {
        if self.poll_interval_secs == 0 {
            return Err(HistoryError::Config("poll_interval_secs must be positive".into()));
        }
        if !(1..=200).contains(&self.page_size) {
            return Err(HistoryError::Config(format!(
                "page_size must be between 1 and 200, got {}",
                self.page_size
            )));
        }
        if self.max_pages == 0 {
            return Err(HistoryError::Config("max_pages must be positive".into()));
        }
        Ok(())
    }

    /// Network details with the Horizon override applied.
    pub fn network_details(&self) -> NetworkDetails {
        let details = self.network.details();
        match &self.horizon_url {
            Some(url) => details.with_horizon_url(url.trim_end_matches('/')),
            None => details,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            horizon_url: None,
            poll_interval_secs: default_poll_interval_secs(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = HistoryConfig::from_toml_str("").unwrap();
        assert_eq!(config, HistoryConfig::default());
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.page_size, 200);
        assert_eq!(config.max_pages, 1);
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn horizon_override_applies() {
        let config = HistoryConfig::from_toml_str(
            r#"
            network = "testnet"
            horizon_url = "http://localhost:8000/"
            max_pages = 3
            "#,
        )
        .unwrap();
        let details = config.network_details();
        assert_eq!(details.network, Network::Testnet);
        assert_eq!(details.horizon_url, "http://localhost:8000");
        assert_eq!(details.passphrase, Network::Testnet.passphrase());
        assert_eq!(config.max_pages, 3);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            HistoryConfig::from_toml_str("page_size = 500"),
            Err(HistoryError::Config(_))
        ));
        assert!(HistoryConfig::from_toml_str("poll_interval_secs = 0").is_err());
        assert!(HistoryConfig::from_toml_str("network = \"devnet\"").is_err());
    }

    #[test]
    fn loads_from_file_and_round_trips() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network = \"futurenet\"\npoll_interval_secs = 5").unwrap();
        let config = HistoryConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.network, Network::Futurenet);
        assert_eq!(config.poll_interval_secs, 5);

        let again = HistoryConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn missing_file_is_config_error() {
        assert!(matches!(
            HistoryConfig::from_toml_file("/nonexistent/strand.toml"),
            Err(HistoryError::Config(_))
        ));
    }
}
