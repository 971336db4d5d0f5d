use regex::{NoExpand, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{PublishError, Result};

pub const MARKER_OPEN: &str = r#"<pre id="content">"#;
pub const MARKER_CLOSE: &str = "</pre>";

/// Non-greedy, may span lines
static MARKER_REGION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<pre id="content">.*?</pre>"#).unwrap());

/// Escapes `&`, `<` and `>` for embedding in HTML
///
/// `&` goes first so the entities produced for `<` and `>` are not escaped
/// again. `None` yields an empty string.
pub fn escape_html<'a>(input: impl Into<Option<&'a str>>) -> String {
    input
        .into()
        .unwrap_or_default()
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A template known to contain a `<pre id="content">…</pre>` region
///
/// Publishing swaps the body of the first such region for the escaped page
/// text and leaves every other byte of the template alone.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Validate `source` as a template; `path` is only used in errors
    pub fn new(source: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        if !MARKER_REGION.is_match(&source) {
            return Err(PublishError::TemplateInvalid { path: path.into() });
        }
        Ok(Self { source })
    }

    /// Read and validate a template file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source =
            std::fs::read_to_string(path).map_err(|e| PublishError::io(path, e))?;
        Self::new(source, path)
    }

    /// Replace the first marker body with the escaped form of `text`
    pub fn splice(&self, text: &str) -> String {
        let body = format!("{}{}{}", MARKER_OPEN, escape_html(text), MARKER_CLOSE);
        MARKER_REGION
            .replacen(&self.source, 1, NoExpand(&body))
            .into_owned()
    }
}

/// One-shot splice of `text` into `template`
pub fn splice(template: &str, text: &str) -> Result<String> {
    Ok(Template::new(template, "<inline>")?.splice(text))
}
