pub mod fetcher;
pub mod html;
pub mod notion;
pub mod raw;
pub mod rendered;

pub use fetcher::Fetcher;
pub use html::HtmlFetcher;
pub use notion::NotionFetcher;
pub use raw::RawFetcher;
pub use rendered::RenderedFetcher;

use std::time::Duration;

use crate::SourceKind;
use crate::config::PublishConfig;
use crate::error::{FetchError, PublishError, Result};

/// User-Agent string for HTTP requests.
const USER_AGENT: &str = concat!("layer-publish/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the content API credential
pub const NOTION_TOKEN_VAR: &str = "NOTION_TOKEN";

/// Environment variable overriding the configured WebDriver endpoint
pub const WEBDRIVER_URL_VAR: &str = "WEBDRIVER_URL";

/// Build the HTTP client shared by the plain and API fetchers
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(timeout)
        .build()
        .map_err(|e| PublishError::Config(format!("failed to build HTTP client: {e}")))
}

/// The fetcher selected for a run
pub enum SourceFetcher {
    Raw(RawFetcher),
    Html(HtmlFetcher),
    Rendered(RenderedFetcher),
    NotionApi(NotionFetcher),
}

impl SourceFetcher {
    /// Build the fetcher for `kind`, reading credentials from the environment
    pub fn from_config(kind: SourceKind, config: &PublishConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.http_timeout_secs);

        let fetcher = match kind {
            SourceKind::Raw => Self::Raw(RawFetcher::new(http_client(timeout)?)),
            SourceKind::Html => Self::Html(HtmlFetcher::new(http_client(timeout)?)),
            SourceKind::Rendered => {
                let mut webdriver_url = config.webdriver_url.clone();

                // Override the WebDriver URL with an environment variable if provided
                if let Ok(url) = std::env::var(WEBDRIVER_URL_VAR) {
                    if !url.is_empty() {
                        webdriver_url = url;
                    }
                }

                Self::Rendered(RenderedFetcher::new(
                    webdriver_url,
                    Duration::from_secs(config.quiescence_timeout_secs),
                ))
            }
            SourceKind::Api => {
                let token = std::env::var(NOTION_TOKEN_VAR)
                    .ok()
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| {
                        PublishError::Config(format!("{NOTION_TOKEN_VAR} is not set"))
                    })?;

                Self::NotionApi(NotionFetcher::new(
                    http_client(timeout)?,
                    token,
                    &config.notion,
                ))
            }
        };

        Ok(fetcher)
    }
}

impl Fetcher for SourceFetcher {
    async fn fetch(&self, id: &str) -> std::result::Result<String, FetchError> {
        match self {
            Self::Raw(f) => f.fetch(id).await,
            Self::Html(f) => f.fetch(id).await,
            Self::Rendered(f) => f.fetch(id).await,
            Self::NotionApi(f) => f.fetch(id).await,
        }
    }
}
