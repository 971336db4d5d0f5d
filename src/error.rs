use std::path::PathBuf;

/// Why a single fetch attempt failed
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The identifier could not be turned into a request URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Connection, TLS or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    /// The content API rejected the request
    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body was not what the content API documents
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    /// WebDriver session or command failure
    #[error("browser error: {0}")]
    Browser(String),
}

/// Errors surfaced by a publish run
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("fetch failed for {id}: {source}")]
    Fetch {
        id: String,
        #[source]
        source: FetchError,
    },

    #[error("template {path:?} is missing <pre id=\"content\">")]
    TemplateInvalid { path: PathBuf },

    #[error("{layer}: content too short ({len}), min required={min}")]
    ContentTooShort { layer: String, len: usize, min: usize },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PublishError>;

impl PublishError {
    /// Wrap a `std::io::Error` with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure guard may swallow this error
    pub fn is_guardable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::ContentTooShort { .. })
    }
}
