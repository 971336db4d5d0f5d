use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::Fetcher;
use crate::config::NotionConfig;
use crate::error::FetchError;

/// A 32-hex page ID, optionally dashed, at the end of a page URL or slug
static PAGE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12})(?:[?#].*)?$")
        .unwrap()
});

/// One node of the page's content tree
#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub id: String,

    /// Type tag, also the key of the type-specific object
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub has_children: bool,

    #[serde(flatten)]
    pub data: HashMap<String, Value>,
}

impl Block {
    /// Concatenated `plain_text` of the block's rich text spans
    pub fn plain_text(&self) -> String {
        self.data
            .get(&self.kind)
            .and_then(|obj| obj.get("rich_text"))
            .and_then(Value::as_array)
            .map(|spans| {
                spans
                    .iter()
                    .filter_map(|span| span.get("plain_text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// One page of a children listing
#[derive(Debug, Deserialize)]
struct ChildrenPage {
    results: Vec<Block>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

/// Error payload returned by the API
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Fetches page text through the content API
///
/// Walks the block tree of a page through the `blocks/{id}/children`
/// endpoint, following pagination cursors and descending into blocks that
/// declare children. Requests are issued one after another.
pub struct NotionFetcher {
    client: Client,
    token: String,
    api_base: String,
    api_version: String,
    page_size: u32,
}

impl NotionFetcher {
    pub fn new(client: Client, token: String, config: &NotionConfig) -> Self {
        Self {
            client,
            token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            page_size: config.page_size,
        }
    }

    /// Text of every block below `block_id`, depth-first, newline-joined
    async fn children_text(&self, block_id: &str) -> Result<String, FetchError> {
        let mut out: Vec<String> = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self.children_page(block_id, cursor.as_deref()).await?;
            ::log::debug!(
                "Block {} page returned {} children (has_more={})",
                block_id,
                page.results.len(),
                page.has_more
            );

            for block in &page.results {
                out.push(block.plain_text());
                if block.has_children {
                    out.push(Box::pin(self.children_text(&block.id)).await?);
                }
            }

            if !page.has_more {
                break;
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => {
                    ::log::warn!("Block {} reported more children without a cursor", block_id);
                    break;
                }
            }
        }

        Ok(join_chunks(out))
    }

    async fn children_page(
        &self,
        block_id: &str,
        cursor: Option<&str>,
    ) -> Result<ChildrenPage, FetchError> {
        let url = format!("{}/v1/blocks/{}/children", self.api_base, block_id);
        let mut query = vec![("page_size", self.page_size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("start_cursor", cursor.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version)
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl Fetcher for NotionFetcher {
    async fn fetch(&self, id: &str) -> Result<String, FetchError> {
        let page_id = page_id_from(id);
        ::log::info!("Listing blocks of page {}", page_id);
        let chunks = vec![self.children_text(&page_id).await?];
        Ok(join_chunks(chunks))
    }
}

/// Pull the page ID out of a page URL, or return the input unchanged
pub fn page_id_from(input: &str) -> String {
    let input = input.trim();
    PAGE_ID
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| input.to_string())
}

fn join_chunks(chunks: Vec<String>) -> String {
    chunks
        .into_iter()
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn api_error(status: StatusCode, body: &str) -> FetchError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    match (parsed.code, parsed.message) {
        (Some(code), Some(message)) => FetchError::Api {
            status: status.as_u16(),
            code,
            message,
        },
        _ => FetchError::Status(status),
    }
}
