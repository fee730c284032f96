use std::time::Duration;

use anyhow::Context;
use log::trace;

use crate::config::OlaConfig;
use crate::frame::DMX_CHANNELS;

/// Downstream side of the output: something that can take a full universe.
pub trait DmxClient {
    /// Handshake with the daemon. Called on explicit connect and before a
    /// send while disconnected.
    fn setup(&mut self) -> anyhow::Result<()>;

    fn send_dmx(&mut self, universe: u32, data: &[u8; DMX_CHANNELS]) -> anyhow::Result<()>;
}

/// Client for olad's built-in web server.
///
/// `setup` probes `/json/server_stats`, `send_dmx` posts to `/set_dmx`. The
/// request timeout bounds every call so an absent daemon fails fast.
pub struct OlaClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl OlaClient {
    pub fn new(config: &OlaConfig) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(OlaClient {
            http,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl DmxClient for OlaClient {
    fn setup(&mut self) -> anyhow::Result<()> {
        let url = format!("{}/json/server_stats", self.base_url);
        self.http
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("GET {}", url))?;
        Ok(())
    }

    fn send_dmx(&mut self, universe: u32, data: &[u8; DMX_CHANNELS]) -> anyhow::Result<()> {
        let url = format!("{}/set_dmx", self.base_url);
        trace!("POST {} universe {}", url, universe);
        self.http
            .post(&url)
            .form(&set_dmx_form(universe, data))
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("POST {} (universe {})", url, universe))?;
        Ok(())
    }
}

/// Form fields olad expects on `/set_dmx`: `u` the universe, `d` the comma
/// separated channel values.
pub fn set_dmx_form(universe: u32, data: &[u8]) -> [(&'static str, String); 2] {
    let values = data
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",");
    [("u", universe.to_string()), ("d", values)]
}
