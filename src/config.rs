//! Runtime configuration for the review client.
//!
//! Values come from the process environment (after `.env` is loaded by the
//! binary) and can be overridden from the command line.

use anyhow::{Result, bail};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_FRAME_RATE: f64 = 30.0;
pub const DEFAULT_SEEK_LEAD_SECS: f64 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    /// Playback rate assumed for frame indices when the schedule carries none.
    pub frame_rate: f64,
    /// How far before a detection's frame the video is positioned.
    pub seek_lead_secs: f64,
    pub http_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            frame_rate: DEFAULT_FRAME_RATE,
            seek_lead_secs: DEFAULT_SEEK_LEAD_SECS,
            http_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl ReviewConfig {
    /// Reads configuration from `REVIEW_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("REVIEW_API_BASE_URL") {
            config.base_url = url;
        }
        config.api_token = lookup("REVIEW_API_TOKEN").filter(|t| !t.trim().is_empty());

        if let Some(raw) = lookup("REVIEW_FRAME_RATE") {
            config.frame_rate = parse_number("REVIEW_FRAME_RATE", &raw)?;
        }
        if let Some(raw) = lookup("REVIEW_SEEK_LEAD_SECS") {
            config.seek_lead_secs = parse_number("REVIEW_SEEK_LEAD_SECS", &raw)?;
        }
        if let Some(raw) = lookup("REVIEW_HTTP_TIMEOUT_SECS") {
            config.http_timeout = Duration::from_secs(parse_secs("REVIEW_HTTP_TIMEOUT_SECS", &raw)?);
        }
        if let Some(raw) = lookup("REVIEW_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout =
                Duration::from_secs(parse_secs("REVIEW_CONNECT_TIMEOUT_SECS", &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        token: Option<String>,
        frame_rate: Option<f64>,
    ) -> Result<Self> {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if token.is_some() {
            self.api_token = token;
        }
        if let Some(rate) = frame_rate {
            self.frame_rate = rate;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            bail!("frame rate must be a positive number, got {}", self.frame_rate);
        }
        if !self.seek_lead_secs.is_finite() || self.seek_lead_secs < 0.0 {
            bail!(
                "seek lead must be zero or a positive number, got {}",
                self.seek_lead_secs
            );
        }
        if self.base_url.trim().is_empty() {
            bail!("API base URL must not be empty");
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

fn parse_number(key: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| anyhow::anyhow!("{key}: invalid number '{raw}': {e}"))
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| anyhow::anyhow!("{key}: invalid seconds '{raw}': {e}"))
}
