use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{PublishError, Result};
use crate::results::PublishOutcome;

/// Output left behind by an earlier run, read before fetching
///
/// Only its presence matters, so the bytes are kept as-is and never decoded.
#[derive(Debug, Clone)]
pub struct PreviousOutput {
    path: PathBuf,
    len: usize,
}

impl PreviousOutput {
    /// Read `path` if present; a missing file is not an error
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let len = match std::fs::read(&path) {
            Ok(bytes) => bytes.len(),
            Err(e) if e.kind() == ErrorKind::NotFound => 0,
            Err(e) => {
                ::log::warn!("Could not read previous output {:?}: {}", path, e);
                0
            }
        };
        Self { path, len }
    }

    /// Whether there is earlier output worth keeping
    pub fn exists(&self) -> bool {
        self.len > 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decides whether a failed run may fall back to the previous output
///
/// A transient upstream outage must not blank out content that was already
/// published: a failed or too-short fetch with earlier output on disk turns
/// into a logged no-op.
#[derive(Debug, Clone, Copy)]
pub struct FailureGuard {
    enabled: bool,
}

impl FailureGuard {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Turn a guardable error into a no-op when earlier output exists
    ///
    /// Template and configuration errors always pass through.
    pub fn recover(
        &self,
        error: PublishError,
        previous: &PreviousOutput,
        layer: &str,
    ) -> Result<PublishOutcome> {
        if self.enabled && error.is_guardable() && previous.exists() {
            ::log::warn!(
                "{}: {} -> keeping previous {}",
                layer,
                error,
                previous.path().display()
            );
            return Ok(PublishOutcome::KeptPrevious {
                layer: layer.to_string(),
                path: previous.path().to_path_buf(),
                reason: error.to_string(),
            });
        }
        Err(error)
    }
}
