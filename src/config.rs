//! Runtime configuration read from the environment (and `.env`, loaded by
//! the binary).

use anyhow::{Context, Result};
use reqwest::Url;
use std::time::Duration;

pub const API_URL_VAR: &str = "EMISSIONS_API_URL";
pub const SHARE_BASE_URL_VAR: &str = "SHARE_BASE_URL";
pub const TIMEOUT_VAR: &str = "HTTP_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "HTTP_CONNECT_TIMEOUT_SECS";

const DEFAULT_SHARE_BASE_URL: &str = "http://localhost:3000/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint receiving simulation payloads.
    pub api_url: Url,
    /// Page shareable links point to.
    pub share_base_url: Url,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup(API_URL_VAR).with_context(|| format!("{API_URL_VAR} must be set"))?;
        let api_url = Url::parse(&api_url).with_context(|| format!("{API_URL_VAR} is not a URL"))?;

        let share_base_url = lookup(SHARE_BASE_URL_VAR)
            .unwrap_or_else(|| DEFAULT_SHARE_BASE_URL.to_string());
        let share_base_url = Url::parse(&share_base_url)
            .with_context(|| format!("{SHARE_BASE_URL_VAR} is not a URL"))?;

        Ok(Self {
            api_url,
            share_base_url,
            timeout: secs(&lookup, TIMEOUT_VAR, DEFAULT_TIMEOUT_SECS)?,
            connect_timeout: secs(&lookup, CONNECT_TIMEOUT_VAR, DEFAULT_CONNECT_TIMEOUT_SECS)?,
        })
    }
}

fn secs(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    let secs = match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds"))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}
