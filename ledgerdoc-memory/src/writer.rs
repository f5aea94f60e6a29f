use async_trait::async_trait;
use bson::Bson;
use mea::rwlock::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use ledgerdoc_core::{backend::BulkWriter, error::DocumentStoreResult};

use crate::store::{StoreState, validate_write};

/// Client-side write buffer for one collection of an [`InMemoryStore`](crate::InMemoryStore).
///
/// A flush applies the whole buffer under a single write lock, so readers observe
/// either none or all of a flushed group.
#[derive(Debug)]
pub struct InMemoryBulkWriter {
    state: Arc<RwLock<StoreState>>,
    collection: String,
    buffer: Vec<(String, Bson)>,
}

impl InMemoryBulkWriter {
    pub(crate) fn new(state: Arc<RwLock<StoreState>>, collection: String) -> Self {
        Self {
            state,
            collection,
            buffer: Vec::new(),
        }
    }
}

#[async_trait]
impl BulkWriter for InMemoryBulkWriter {
    fn set(&mut self, id: &str, data: Bson) -> DocumentStoreResult<()> {
        validate_write(id, &data)?;
        self.buffer.push((id.to_string(), data));

        Ok(())
    }

    fn pending(&self) -> usize {
        self.buffer.len()
    }

    async fn flush(&mut self) -> DocumentStoreResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        // The buffer is only drained once the lock is held, so a cancelled flush keeps it.
        let mut state = self.state.write().await;
        let count = self.buffer.len();

        for (id, data) in self.buffer.drain(..) {
            state.put(&self.collection, &id, data);
        }

        debug!(target: "ledgerdoc::memory", collection = %self.collection, count, "Flushed bulk writes");

        Ok(())
    }
}

impl Drop for InMemoryBulkWriter {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            warn!(
                target: "ledgerdoc::memory",
                collection = %self.collection,
                discarded = self.buffer.len(),
                "Dropping bulk writer with unflushed writes"
            );
        }
    }
}
