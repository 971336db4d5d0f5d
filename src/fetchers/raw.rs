use reqwest::Client;
use url::Url;

use super::Fetcher;
use crate::error::FetchError;

/// Returns the response body of a single GET, untouched
pub struct RawFetcher {
    client: Client,
}

impl RawFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for RawFetcher {
    async fn fetch(&self, id: &str) -> Result<String, FetchError> {
        get_text(&self.client, id).await
    }
}

/// GET `id` and return its body, failing on any non-success status
pub(crate) async fn get_text(client: &Client, id: &str) -> Result<String, FetchError> {
    let url = Url::parse(id)?;
    ::log::debug!("GET {}", url);

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let body = response.text().await?;
    ::log::debug!("Received {} bytes from {}", body.len(), id);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> RawFetcher {
        RawFetcher::new(crate::fetchers::http_client(Duration::from_secs(5)).unwrap())
    }

    #[tokio::test]
    async fn test_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Hello <b>there</b>"))
            .expect(1)
            .mount(&server)
            .await;

        let text = fetcher()
            .fetch(&format!("{}/page", server.uri()))
            .await
            .unwrap();
        assert_eq!(text, "Hello <b>there</b>");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/missing", server.uri()))
            .await
            .unwrap_err();
        match err {
            FetchError::Status(status) => assert_eq!(status.as_u16(), 404),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let err = fetcher().fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
