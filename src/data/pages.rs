//! Fetcher for the World Government Bonds pages.

use log::info;
use reqwest::blocking::Client;

use crate::data::http;
use crate::error::AppError;

pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            client: http::build_client()?,
        })
    }

    /// Download the HTML of `url`.
    pub fn fetch(&self, url: &str) -> Result<String, AppError> {
        info!("Fetching {url}");
        let html = http::get_text(&self.client, url)?;
        info!("Fetched {} bytes from {url}", html.len());
        Ok(html)
    }
}
