use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{PublishError, Result};

/// Configuration for the content API fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Base URL of the API (without the `/v1` suffix)
    #[serde(default = "default_notion_api_base")]
    pub api_base: String,

    /// Value sent in the `Notion-Version` header
    #[serde(default = "default_notion_api_version")]
    pub api_version: String,

    /// Children requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Configuration for a publish run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Template containing the `<pre id="content">` region
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,

    /// Directory receiving `<LAYER>.html`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Keep the previous output when fetching fails or yields too little text
    #[serde(default = "default_keep_previous")]
    pub keep_previous_on_fail: bool,

    /// Minimum normalized length per layer
    #[serde(default = "default_min_chars")]
    pub min_chars: HashMap<String, usize>,

    /// Minimum for layers missing from `min_chars`
    #[serde(default = "default_fallback_min_chars")]
    pub default_min_chars: usize,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Timeout for plain HTTP requests, in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Upper bound on waiting for a rendered page to go quiet, in seconds
    #[serde(default = "default_quiescence_timeout_secs")]
    pub quiescence_timeout_secs: u64,

    #[serde(default)]
    pub notion: NotionConfig,
}

fn default_template_path() -> PathBuf {
    PathBuf::from("docs/_template.html")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("docs")
}

fn default_keep_previous() -> bool {
    true
}

/// L4 may legitimately be near-empty
fn default_min_chars() -> HashMap<String, usize> {
    [("L1", 200), ("L2", 200), ("L3", 200), ("L4", 1), ("L5", 200)]
        .into_iter()
        .map(|(layer, min)| (layer.to_string(), min))
        .collect()
}

fn default_fallback_min_chars() -> usize {
    1
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_quiescence_timeout_secs() -> u64 {
    20
}

fn default_notion_api_base() -> String {
    "https://api.notion.com".to_string()
}

fn default_notion_api_version() -> String {
    "2022-06-28".to_string()
}

fn default_page_size() -> u32 {
    100
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            api_base: default_notion_api_base(),
            api_version: default_notion_api_version(),
            page_size: default_page_size(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            output_dir: default_output_dir(),
            keep_previous_on_fail: default_keep_previous(),
            min_chars: default_min_chars(),
            default_min_chars: default_fallback_min_chars(),
            webdriver_url: default_webdriver_url(),
            http_timeout_secs: default_http_timeout_secs(),
            quiescence_timeout_secs: default_quiescence_timeout_secs(),
            notion: NotionConfig::default(),
        }
    }
}

impl PublishConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| PublishError::io(path, e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| PublishError::io(path, e))?;

        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PublishError::Config(e.to_string()))
    }

    /// Minimum normalized length required for `layer`
    pub fn min_chars_for(&self, layer: &str) -> usize {
        self.min_chars
            .get(layer)
            .copied()
            .unwrap_or(self.default_min_chars)
    }

    /// Where the output for `layer` is written
    pub fn output_path(&self, layer: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.html", crate::utils::sanitize_layer(layer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PublishConfig::default();
        assert_eq!(config.template_path, PathBuf::from("docs/_template.html"));
        assert!(config.keep_previous_on_fail);
        assert_eq!(config.notion.page_size, 100);
        assert_eq!(config.output_path("L3"), PathBuf::from("docs/L3.html"));
    }

    #[test]
    fn test_min_chars_per_layer() {
        let config = PublishConfig::default();
        assert_eq!(config.min_chars_for("L1"), 200);
        assert_eq!(config.min_chars_for("L4"), 1);
        assert_eq!(config.min_chars_for("L5"), 200);
        assert_eq!(config.min_chars_for("custom"), 1);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = PublishConfig::from_json(
            r#"{ "output_dir": "site", "min_chars": { "L1": 50 }, "notion": { "page_size": 25 } }"#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("site"));
        assert_eq!(config.min_chars_for("L1"), 50);
        // An explicit map replaces the built-in one
        assert_eq!(config.min_chars_for("L2"), 1);
        assert_eq!(config.notion.page_size, 25);
        assert_eq!(config.notion.api_version, "2022-06-28");
        assert_eq!(config.webdriver_url, "http://localhost:4444");
    }

    #[test]
    fn test_invalid_json() {
        let err = PublishConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, PublishError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("publish.json");
        std::fs::write(&path, r#"{ "keep_previous_on_fail": false }"#).unwrap();
        let config = PublishConfig::from_file(&path).unwrap();
        assert!(!config.keep_previous_on_fail);
        assert_eq!(config.min_chars_for("L1"), 200);
    }
}
