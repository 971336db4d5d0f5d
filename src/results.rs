use serde::Serialize;
use std::path::PathBuf;

use crate::error::Result;

/// What a publish run did to its output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// The output was regenerated from freshly fetched text
    Updated {
        layer: String,
        path: PathBuf,
        /// Length of the normalized text, in characters
        chars: usize,
    },

    /// Fetching failed or came back too short; the previous output stays
    KeptPrevious {
        layer: String,
        path: PathBuf,
        reason: String,
    },
}

impl PublishOutcome {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Updated { path, .. } | Self::KeptPrevious { path, .. } => path,
        }
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Process exit status for a finished run
///
/// A guarded no-op is a success.
pub fn exit_code(result: &Result<PublishOutcome>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}
