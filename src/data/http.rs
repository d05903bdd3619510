//! Blocking HTTP helpers shared by the page fetcher, the flag cache and the
//! World Bank client.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::AppError;

/// The bond site serves a stripped page to unknown agents, so we present a
/// desktop browser user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0 Safari/537.36";

const TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_client() -> Result<Client, AppError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| AppError::external(format!("Failed to build HTTP client: {e}")))
}

/// GET `url` and return the body as text. Non-2xx statuses are errors.
pub fn get_text(client: &Client, url: &str) -> Result<String, AppError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::external(format!("Request to {url} failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::external(format!(
            "Request to {url} failed with status {}.",
            resp.status()
        )));
    }

    resp.text()
        .map_err(|e| AppError::external(format!("Failed to read response body from {url}: {e}")))
}

/// GET `url` and return the raw body bytes. Non-2xx statuses are errors.
pub fn get_bytes(client: &Client, url: &str) -> Result<Vec<u8>, AppError> {
    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::external(format!("Request to {url} failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::external(format!(
            "Request to {url} failed with status {}.",
            resp.status()
        )));
    }

    resp.bytes()
        .map(|b| b.to_vec())
        .map_err(|e| AppError::external(format!("Failed to read response body from {url}: {e}")))
}
