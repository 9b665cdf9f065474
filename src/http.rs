use crate::config::AppConfig;
use anyhow::{Context, Result};

/// Build the HTTP client shared by the dictionary, weather and currency commands.
pub fn build_client(cfg: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(format!("classwork/{}", env!("CARGO_PKG_VERSION")))
        .timeout(cfg.http_timeout)
        .build()
        .context("build http client")
}
