//! An in-memory search index for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use mailroom::{SearchDocument, SearchIndex};

/// Records every document it is asked to index.
///
/// Set `fail` to make every call return an error.
#[derive(Debug, Default)]
pub struct RecordingIndex {
    documents: Mutex<Vec<SearchDocument>>,
    pub fail: bool,
}

impl RecordingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// An index that rejects every batch.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Everything indexed so far, in call order.
    pub fn documents(&self) -> Vec<SearchDocument> {
        self.documents
            .lock()
            .map(|docs| docs.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SearchIndex for RecordingIndex {
    async fn index(&self, documents: &[SearchDocument]) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("recording index configured to fail");
        }
        self.documents
            .lock()
            .map_err(|e| anyhow::anyhow!("index lock poisoned: {e}"))?
            .extend_from_slice(documents);
        Ok(())
    }
}
