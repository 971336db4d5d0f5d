use reqwest::Client;

use super::Fetcher;
use super::raw::get_text;
use crate::error::FetchError;
use crate::parsers;

/// Fetches a page and extracts the text of its main content region
pub struct HtmlFetcher {
    client: Client,
}

impl HtmlFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HtmlFetcher {
    async fn fetch(&self, id: &str) -> Result<String, FetchError> {
        let html = get_text(&self.client, id).await?;
        let text = parsers::extract_text(&html);
        ::log::info!("Extracted {} chars of text from {}", text.chars().count(), id);
        Ok(text)
    }
}
