use crate::error::FetchError;

/// Retrieves the plain text behind one document identifier
///
/// Implementations attempt the fetch exactly once; the caller decides what a
/// failure means for the run.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Fetch the text for `id` (a URL or a content API page ID)
    async fn fetch(&self, id: &str) -> Result<String, FetchError>;
}
