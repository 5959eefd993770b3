//! No-op object store implementation.

use async_trait::async_trait;
use filings_core::{ObjectStore, Result};
use tracing::trace;

/// An object store that doesn't store anything.
///
/// `get` always returns `Ok(None)` and `put` always succeeds, so every filing
/// document is fetched from the archive.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObjectStore;

impl NoopObjectStore {
    /// Create a new no-op object store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ObjectStore for NoopObjectStore {
    async fn put(&self, key: &str, _bytes: &[u8], _content_type: &str) -> Result<()> {
        trace!(key, "NoopObjectStore: put called, doing nothing");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        trace!(key, "NoopObjectStore: get called, returning None");
        Ok(None)
    }
}
