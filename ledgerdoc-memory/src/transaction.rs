//! Optimistic transactions over the in-memory store.

use async_trait::async_trait;
use bson::Bson;
use mea::rwlock::RwLock;
use std::sync::Arc;

use ledgerdoc_core::{
    backend::AtomicTransaction,
    error::{DocumentStoreError, DocumentStoreResult},
};

use crate::store::{StoreState, validate_write};

#[derive(Debug)]
struct ObservedRead {
    collection: String,
    id: String,
    revision: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
enum WriteMode {
    Set,
    Create,
}

#[derive(Debug)]
struct StagedWrite {
    mode: WriteMode,
    collection: String,
    id: String,
    data: Bson,
}

/// Why a commit did not go through.
#[derive(Debug)]
pub(crate) enum CommitError {
    /// A document read by the attempt changed before the commit; the attempt may be retried.
    Conflict { collection: String, id: String },
    /// The commit is invalid as a whole and must not be retried.
    Failed(DocumentStoreError),
}

/// One attempt of an atomic operation.
///
/// Reads go straight to the shared state and remember the revision they saw. Writes
/// stay local until [`MemoryTransaction::commit`], so dropping the transaction at any
/// point leaves the store untouched.
#[derive(Debug)]
pub(crate) struct MemoryTransaction {
    state: Arc<RwLock<StoreState>>,
    reads: Vec<ObservedRead>,
    writes: Vec<StagedWrite>,
}

impl MemoryTransaction {
    pub(crate) fn new(state: Arc<RwLock<StoreState>>) -> Self {
        Self {
            state,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    fn stage(&mut self, mode: WriteMode, collection: &str, id: &str, data: Bson) -> DocumentStoreResult<()> {
        validate_write(id, &data)?;

        self.writes.push(StagedWrite {
            mode,
            collection: collection.to_string(),
            id: id.to_string(),
            data,
        });

        Ok(())
    }

    /// Validates the observed reads and applies every staged write under one write lock.
    pub(crate) async fn commit(self) -> Result<(), CommitError> {
        let mut state = self.state.write().await;

        for read in &self.reads {
            if state.revision_of(&read.collection, &read.id) != read.revision {
                return Err(CommitError::Conflict {
                    collection: read.collection.clone(),
                    id: read.id.clone(),
                });
            }
        }

        for write in &self.writes {
            if write.mode == WriteMode::Create && state.document(&write.collection, &write.id).is_some() {
                return Err(CommitError::Failed(DocumentStoreError::DocumentAlreadyExists(
                    write.id.clone(),
                    write.collection.clone(),
                )));
            }
        }

        for write in self.writes {
            state.put(&write.collection, &write.id, write.data);
        }

        Ok(())
    }
}

#[async_trait]
impl AtomicTransaction for MemoryTransaction {
    async fn get(&mut self, collection: &str, id: &str) -> DocumentStoreResult<Option<Bson>> {
        if !self.writes.is_empty() {
            return Err(DocumentStoreError::InvalidArgument(format!(
                "read of {collection}/{id} after a write; reads must precede writes in a transaction"
            )));
        }

        let state = self.state.read().await;
        let document = state.document(collection, id);

        self.reads.push(ObservedRead {
            collection: collection.to_string(),
            id: id.to_string(),
            revision: document.map(|doc| doc.revision),
        });

        Ok(document.map(|doc| doc.data.clone()))
    }

    fn set(&mut self, collection: &str, id: &str, data: Bson) -> DocumentStoreResult<()> {
        self.stage(WriteMode::Set, collection, id, data)
    }

    fn create(&mut self, collection: &str, id: &str, data: Bson) -> DocumentStoreResult<()> {
        self.stage(WriteMode::Create, collection, id, data)
    }
}
