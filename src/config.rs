use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Base address of the remote file-indexing service.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct DownloadsConfig {
    #[serde(default = "default_download_dir")]
    pub dir: PathBuf,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            dir: default_download_dir(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

impl Config {
    /// Config with every default and the given service address.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            service: ServiceConfig {
                base_url: base_url.into(),
                timeout_secs: default_timeout_secs(),
            },
            poller: PollerConfig::default(),
            downloads: DownloadsConfig::default(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poller.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.service.base_url)
            .with_context(|| format!("service.base_url is not a URL: {}", self.service.base_url))?;
        match url.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!(
                "service.base_url must use http or https, got '{}'",
                other
            ),
        }

        if self.service.timeout_secs == 0 {
            anyhow::bail!("service.timeout_secs must be > 0");
        }

        if self.poller.interval_secs == 0 {
            anyhow::bail!("poller.interval_secs must be > 0");
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
