use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub ola: OlaConfig,
    pub output: OutputConfig,
    pub log: LogConfig,
}

/// Where olad's web server lives.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OlaConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl OlaConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for OlaConfig {
    fn default() -> Self {
        OlaConfig {
            host: "localhost".to_string(),
            port: 9090,
            timeout_ms: 1000,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub universe: u32,
    pub blackout: bool,
    /// Handshake once at start-up so the first state notice goes out early.
    pub connect_on_start: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            universe: 0,
            blackout: false,
            connect_on_start: true,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn level_filter(&self) -> anyhow::Result<log::LevelFilter> {
        self.level
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid log level: {}", self.level))
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Unable to open the config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Unable to parse the config file {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.log.level_filter()?;
    Ok(config)
}
