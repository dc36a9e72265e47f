use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use serde_json::Value;
use tracing::info;

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client; the timeout of the first caller sticks.
pub fn http_client(timeout_secs: u64) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build http client")
    })
}

/// GETs a JSON document. Any non-success status is fatal.
pub fn download_json(client: &Client, url: &str) -> Result<Value> {
    info!(url, "downloading");
    let resp = client
        .get(url)
        .header(USER_AGENT, "Mozilla/5.0")
        .send()
        .with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {status}: {url}"));
    }
    serde_json::from_str::<Value>(body.trim()).with_context(|| format!("invalid json from {url}"))
}
