//! CLI configuration.
//!
//! Settings live in `~/.config/calwire/config.toml` by default. Command-line
//! flags take precedence over the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use calwire_protocol::{DavConfig, Namespaces};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};
use crate::tracing::{LogFormat, TracingConfig};

/// Configuration for the calwire CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the CalDAV server (usually the calendar home).
    pub url: Option<String>,

    /// Request timeout in seconds.
    pub timeout: u64,

    /// Whether to verify TLS certificates.
    pub verify_tls: bool,

    /// User agent sent with every request.
    pub user_agent: Option<String>,

    /// Log output format.
    pub log_format: LogFormat,

    /// Log filter directive, e.g. `calwire_protocol=trace`. Replaces `RUST_LOG`.
    pub log_filter: Option<String>,

    /// Extra namespace prefixes, usable in `--prop`.
    pub namespaces: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: DavConfig::DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
            user_agent: None,
            log_format: LogFormat::default(),
            log_filter: None,
            namespaces: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calwire")
            .join("config.toml")
    }

    /// Builds the transport configuration, preferring `url_override`.
    pub fn dav_config(&self, url_override: Option<&str>) -> CliResult<DavConfig> {
        let url = url_override
            .or(self.url.as_deref())
            .ok_or_else(|| CliError::Config("no server URL (use --url or set url)".into()))?;

        let mut config = DavConfig::new(url)
            .map_err(|e| CliError::Config(format!("invalid URL {}: {}", url, e)))?
            .with_timeout(Duration::from_secs(self.timeout));
        if !self.verify_tls {
            config = config.with_insecure_tls();
        }
        if let Some(ref agent) = self.user_agent {
            config = config.with_user_agent(agent.as_str());
        }
        Ok(config)
    }

    /// Tracing settings; `debug` takes precedence over `log_filter`.
    pub fn tracing_config(&self, debug: bool) -> TracingConfig {
        let config = if debug {
            TracingConfig::debug()
        } else {
            match self.log_filter {
                Some(ref filter) => TracingConfig::default().with_env_filter(filter.as_str()),
                None => TracingConfig::default(),
            }
        };
        config.with_format(self.log_format)
    }

    /// The default prefix table plus configured extras.
    pub fn namespace_table(&self) -> Namespaces {
        self.namespaces
            .iter()
            .fold(Namespaces::default(), |table, (prefix, uri)| {
                table.with_prefix(prefix.as_str(), uri.as_str())
            })
    }
}
