// Re-export modules
pub mod config;
pub mod error;
pub mod fetchers;
pub mod guard;
pub mod parsers;
pub mod results;
pub mod template;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::PublishConfig;
pub use error::{FetchError, PublishError, Result};
pub use fetchers::{Fetcher, SourceFetcher};
pub use results::{PublishOutcome, exit_code};
pub use template::{Template, escape_html, splice};

use std::path::{Path, PathBuf};

use guard::{FailureGuard, PreviousOutput};

/// Ways of turning a document identifier into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Response body of a plain GET
    Raw,
    /// Main content region of the fetched HTML
    Html,
    /// Text rendered by a headless browser
    Rendered,
    /// Block tree of the content API
    Api,
}

/// Builder for one publish run: fetch, normalize, splice, write
pub struct Publisher {
    layer: String,
    source_id: String,
    kind: SourceKind,
    config: PublishConfig,
}

impl Publisher {
    /// Create a publisher for `layer` fed from `source_id`
    pub fn new(layer: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            source_id: source_id.into(),
            kind: SourceKind::Api,
            config: PublishConfig::default(),
        }
    }

    /// Set how the source is fetched
    pub fn with_source_kind(mut self, kind: SourceKind) -> Self {
        self.kind = kind;
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: PublishConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let config = PublishConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Override the template path
    pub fn with_template_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.template_path = path.into();
        self
    }

    /// Override the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Override the minimum text length for this run's layer
    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.config.min_chars.insert(self.layer.clone(), min_chars);
        self
    }

    /// Enable or disable keeping the previous output on failure
    pub fn with_keep_previous(mut self, keep: bool) -> Self {
        self.config.keep_previous_on_fail = keep;
        self
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Where this run writes its output
    pub fn output_path(&self) -> PathBuf {
        self.config.output_path(&self.layer)
    }

    /// Build the configured fetcher and run the pipeline
    pub async fn publish(self) -> Result<PublishOutcome> {
        let fetcher = SourceFetcher::from_config(self.kind, &self.config)?;
        self.publish_with(&fetcher).await
    }

    /// Run the pipeline with a caller-supplied fetcher
    pub async fn publish_with<F: Fetcher>(&self, fetcher: &F) -> Result<PublishOutcome> {
        self.validate()?;

        let output_path = self.output_path();
        let template = Template::load(&self.config.template_path)?;
        let previous = PreviousOutput::load(&output_path);
        let guard = FailureGuard::new(self.config.keep_previous_on_fail);

        ::log::info!(
            "Publishing {} from {} ({:?})",
            self.layer,
            self.source_id,
            self.kind
        );

        let text = match self.fetch_text(fetcher).await {
            Ok(text) => text,
            Err(e) => return guard.recover(e, &previous, &self.layer),
        };

        let document = template.splice(&text);
        utils::write_atomic(&output_path, &document)?;

        let chars = parsers::text::char_len(&text);
        ::log::info!(
            "Updated {} (chars={})",
            output_path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default(),
            chars
        );

        Ok(PublishOutcome::Updated {
            layer: self.layer.clone(),
            path: output_path,
            chars,
        })
    }

    /// Fetch, normalize and length-check the source text
    async fn fetch_text<F: Fetcher>(&self, fetcher: &F) -> Result<String> {
        let raw = fetcher
            .fetch(&self.source_id)
            .await
            .map_err(|source| PublishError::Fetch {
                id: self.source_id.clone(),
                source,
            })?;

        let text = parsers::normalize(raw.as_str());
        let len = parsers::text::char_len(&text);
        let min = self.config.min_chars_for(&self.layer);
        ::log::debug!(
            "Normalized {} chars down to {} (min {})",
            parsers::text::char_len(&raw),
            len,
            min
        );

        if len < min {
            return Err(PublishError::ContentTooShort {
                layer: self.layer.clone(),
                len,
                min,
            });
        }
        Ok(text)
    }

    fn validate(&self) -> Result<()> {
        if utils::sanitize_layer(&self.layer).is_empty() {
            return Err(PublishError::Config(format!(
                "invalid layer name {:?}",
                self.layer
            )));
        }
        if self.source_id.trim().is_empty() {
            return Err(PublishError::Config("empty source identifier".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Fetcher returning canned text or failing, counting calls
    struct StubFetcher {
        response: std::result::Result<String, String>,
        calls: Cell<usize>,
    }

    impl StubFetcher {
        fn ok(text: &str) -> Self {
            Self {
                response: Ok(text.to_string()),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err("connection refused".to_string()),
                calls: Cell::new(0),
            }
        }
    }

    impl Fetcher for StubFetcher {
        async fn fetch(&self, _id: &str) -> std::result::Result<String, FetchError> {
            self.calls.set(self.calls.get() + 1);
            self.response.clone().map_err(FetchError::Browser)
        }
    }

    struct Workspace {
        dir: tempfile::TempDir,
    }

    impl Workspace {
        fn new(template: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("_template.html"), template).unwrap();
            Self { dir }
        }

        fn publisher(&self, layer: &str) -> Publisher {
            Publisher::new(layer, "page-id")
                .with_template_path(self.dir.path().join("_template.html"))
                .with_output_dir(self.dir.path())
        }

        fn output(&self, layer: &str) -> PathBuf {
            self.dir.path().join(format!("{layer}.html"))
        }
    }

    const TEMPLATE: &str = r#"<html><pre id="content">OLD</pre></html>"#;

    #[tokio::test]
    async fn test_end_to_end_splice() {
        let ws = Workspace::new(TEMPLATE);
        let fetcher = StubFetcher::ok("Hello &  <World>\r\n\n\n\nDone   now.  ");

        let outcome = ws
            .publisher("L4")
            .publish_with(&fetcher)
            .await
            .unwrap();

        let written = std::fs::read_to_string(ws.output("L4")).unwrap();
        assert_eq!(
            written,
            "<html><pre id=\"content\">Hello &amp; &lt;World&gt;\n\nDone now.</pre></html>"
        );
        assert_eq!(
            outcome,
            PublishOutcome::Updated {
                layer: "L4".to_string(),
                path: ws.output("L4"),
                chars: "Hello & <World>\n\nDone now.".chars().count(),
            }
        );
        assert_eq!(fetcher.calls.get(), 1);
        // The template is left untouched
        assert_eq!(
            std::fs::read_to_string(ws.dir.path().join("_template.html")).unwrap(),
            TEMPLATE
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_without_previous_output() {
        let ws = Workspace::new(TEMPLATE);
        let fetcher = StubFetcher::failing();

        let result = ws.publisher("L1").publish_with(&fetcher).await;

        assert!(matches!(result, Err(PublishError::Fetch { .. })));
        assert_eq!(exit_code(&result), 1);
        assert!(!ws.output("L1").exists());
        assert_eq!(fetcher.calls.get(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_output() {
        let ws = Workspace::new(TEMPLATE);
        std::fs::write(ws.output("L1"), "P").unwrap();

        let result = ws
            .publisher("L1")
            .publish_with(&StubFetcher::failing())
            .await;

        assert!(matches!(result, Ok(PublishOutcome::KeptPrevious { .. })));
        assert_eq!(exit_code(&result), 0);
        assert_eq!(std::fs::read_to_string(ws.output("L1")).unwrap(), "P");
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_non_utf8_previous_output() {
        let ws = Workspace::new(TEMPLATE);
        std::fs::write(ws.output("L1"), [0xff, 0xfe, b'P']).unwrap();

        let result = ws
            .publisher("L1")
            .publish_with(&StubFetcher::failing())
            .await;

        assert!(matches!(result, Ok(PublishOutcome::KeptPrevious { .. })));
        assert_eq!(exit_code(&result), 0);
        assert_eq!(std::fs::read(ws.output("L1")).unwrap(), vec![0xff, 0xfe, b'P']);
    }

    #[tokio::test]
    async fn test_short_content_keeps_previous_output() {
        let ws = Workspace::new(TEMPLATE);
        std::fs::write(ws.output("L2"), "P").unwrap();

        let result = ws
            .publisher("L2")
            .publish_with(&StubFetcher::ok("too short"))
            .await;

        assert!(matches!(result, Ok(PublishOutcome::KeptPrevious { .. })));
        assert_eq!(std::fs::read_to_string(ws.output("L2")).unwrap(), "P");
    }

    #[tokio::test]
    async fn test_short_content_without_previous_output() {
        let ws = Workspace::new(TEMPLATE);

        let err = ws
            .publisher("L2")
            .publish_with(&StubFetcher::ok("   \n\n  "))
            .await
            .unwrap_err();

        match err {
            PublishError::ContentTooShort { len, min, .. } => {
                assert_eq!(len, 0);
                assert_eq!(min, 200);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(!ws.output("L2").exists());
    }

    #[tokio::test]
    async fn test_min_chars_override() {
        let ws = Workspace::new(TEMPLATE);

        let outcome = ws
            .publisher("L2")
            .with_min_chars(3)
            .publish_with(&StubFetcher::ok("abc"))
            .await
            .unwrap();
        assert!(outcome.is_updated());
    }

    #[tokio::test]
    async fn test_invalid_template_is_fatal_even_with_previous_output() {
        let ws = Workspace::new("<html><pre>no marker</pre></html>");
        std::fs::write(ws.output("L4"), "P").unwrap();
        let fetcher = StubFetcher::ok("text");

        let err = ws.publisher("L4").publish_with(&fetcher).await.unwrap_err();

        assert!(matches!(err, PublishError::TemplateInvalid { .. }));
        assert_eq!(fetcher.calls.get(), 0);
        assert_eq!(std::fs::read_to_string(ws.output("L4")).unwrap(), "P");
    }

    #[tokio::test]
    async fn test_missing_template_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Publisher::new("L4", "page-id")
            .with_template_path(dir.path().join("missing.html"))
            .with_output_dir(dir.path())
            .publish_with(&StubFetcher::ok("text"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Io { .. }));
    }

    #[tokio::test]
    async fn test_self_overwriting_template() {
        let ws = Workspace::new(TEMPLATE);
        let target = ws.output("L1");
        std::fs::write(&target, r#"<body><pre id="content">yesterday</pre></body>"#).unwrap();

        Publisher::new("L1", "page-id")
            .with_template_path(&target)
            .with_output_dir(ws.dir.path())
            .with_min_chars(1)
            .publish_with(&StubFetcher::ok("today"))
            .await
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&target).unwrap(),
            r#"<body><pre id="content">today</pre></body>"#
        );
    }

    #[tokio::test]
    async fn test_rejects_empty_layer() {
        let ws = Workspace::new(TEMPLATE);
        let err = ws
            .publisher("  ")
            .publish_with(&StubFetcher::ok("text"))
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::Config(_)));
    }
}
