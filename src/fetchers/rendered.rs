use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

use super::Fetcher;
use crate::error::FetchError;

/// Rendered regions to read, most specific first
pub const RENDERED_SELECTORS: &[&str] = &[".notion-page-content", r#"[role="main"]"#, "body"];

/// Consecutive polls with an unchanged resource count that count as quiet
const STABLE_POLLS: u32 = 2;

/// Delay between quiescence polls
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Reports the document state and how many resources have loaded so far
const LOAD_STATE_SCRIPT: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

/// Reads page text from a headless browser driven over WebDriver
pub struct RenderedFetcher {
    webdriver_url: String,
    quiescence_timeout: Duration,
}

impl RenderedFetcher {
    pub fn new(webdriver_url: String, quiescence_timeout: Duration) -> Self {
        Self {
            webdriver_url,
            quiescence_timeout,
        }
    }

    async fn read_rendered(&self, client: &Client, url: &Url) -> Result<String, FetchError> {
        client.goto(url.as_str()).await.map_err(browser_error)?;

        if tokio::time::timeout(self.quiescence_timeout, wait_for_quiescence(client))
            .await
            .is_err()
        {
            ::log::warn!(
                "{} did not go quiet within {:?}, reading it anyway",
                url,
                self.quiescence_timeout
            );
        }

        for selector in RENDERED_SELECTORS {
            match client.find(Locator::Css(selector)).await {
                Ok(element) => {
                    ::log::debug!("Reading rendered region {}", selector);
                    return element.text().await.map_err(browser_error);
                }
                Err(e) if e.is_no_such_element() => {
                    ::log::trace!("No element matches {}", selector);
                }
                Err(e) => return Err(browser_error(e)),
            }
        }

        Ok(String::new())
    }
}

impl Fetcher for RenderedFetcher {
    async fn fetch(&self, id: &str) -> Result<String, FetchError> {
        let url = Url::parse(id)?;
        let client = connect_to_webdriver(&self.webdriver_url).await?;

        let result = self.read_rendered(&client, &url).await;

        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }

        result
    }
}

/// Capabilities asking for a headless Chrome or Firefox
fn headless_capabilities() -> serde_json::Map<String, Value> {
    let mut caps = serde_json::Map::new();
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": ["--headless=new", "--disable-gpu", "--no-sandbox"] }),
    );
    caps.insert(
        "moz:firefoxOptions".to_string(),
        json!({ "args": ["-headless"] }),
    );
    caps
}

/// Connects to the WebDriver instance
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, FetchError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(headless_capabilities());

    let first_error = match builder.connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            e
        }
    };

    // If we couldn't connect, try with common alternative URLs
    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4723", // Appium default
        "http://localhost:9222", // Chrome debug port default
        "http://127.0.0.1:4444", // Try with IP instead of localhost
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = builder.connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(FetchError::Browser(format!(
        "no WebDriver session available: {first_error}"
    )))
}

/// Polls the page until it is loaded and stops pulling in resources
async fn wait_for_quiescence(client: &Client) {
    let mut tracker = QuiescenceTracker::default();

    loop {
        match client.execute(LOAD_STATE_SCRIPT, vec![]).await {
            Ok(state) => {
                let ready = state.get(0).and_then(Value::as_str) == Some("complete");
                let resources = state.get(1).and_then(Value::as_u64).unwrap_or(0);
                if tracker.observe(ready, resources) {
                    ::log::debug!("Page quiet after {} resources", resources);
                    return;
                }
            }
            Err(e) => {
                // Pages with a strict CSP may refuse scripts; fall back to a fixed wait
                ::log::debug!("Load state check failed: {}", e);
                if tracker.observe(true, 0) {
                    return;
                }
            }
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Decides when a page has gone quiet from successive load-state samples
#[derive(Debug, Default)]
pub struct QuiescenceTracker {
    last_count: Option<u64>,
    stable: u32,
}

impl QuiescenceTracker {
    /// Record a sample; returns true once the page counts as quiet
    pub fn observe(&mut self, ready: bool, resources: u64) -> bool {
        if !ready {
            self.last_count = None;
            self.stable = 0;
            return false;
        }

        if self.last_count == Some(resources) {
            self.stable += 1;
        } else {
            self.last_count = Some(resources);
            self.stable = 0;
        }
        self.stable >= STABLE_POLLS
    }
}

fn browser_error(error: fantoccini::error::CmdError) -> FetchError {
    FetchError::Browser(error.to_string())
}
