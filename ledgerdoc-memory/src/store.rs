//! In-memory storage implementation for document stores.
//!
//! Documents live in per-collection ordered maps behind a single async-aware
//! read-write lock. Every write stamps the document with a store-wide revision number,
//! which is what atomic operations use to detect conflicting writers.

use async_trait::async_trait;
use bson::{Bson, Document};
use futures::{StreamExt, future::BoxFuture, stream};
use mea::rwlock::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tracing::{debug, warn};

use ledgerdoc_core::{
    backend::{AtomicTransaction, DocumentSnapshot, DocumentStream, StoreBackend, StoreBackendBuilder},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Query,
};

use crate::{
    evaluator::DocumentEvaluator,
    transaction::{CommitError, MemoryTransaction},
    writer::InMemoryBulkWriter,
};

/// Number of attempts an atomic operation gets before it is aborted.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

#[derive(Debug)]
pub(crate) struct StoredDocument {
    pub(crate) data: Bson,
    pub(crate) revision: u64,
}

type CollectionMap = BTreeMap<String, StoredDocument>;

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    collections: HashMap<String, CollectionMap>,
    last_revision: u64,
}

impl StoreState {
    pub(crate) fn document(&self, collection: &str, id: &str) -> Option<&StoredDocument> {
        self.collections
            .get(collection)
            .and_then(|documents| documents.get(id))
    }

    pub(crate) fn revision_of(&self, collection: &str, id: &str) -> Option<u64> {
        self.document(collection, id).map(|doc| doc.revision)
    }

    pub(crate) fn put(&mut self, collection: &str, id: &str, data: Bson) {
        self.last_revision += 1;
        let revision = self.last_revision;

        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), StoredDocument { data, revision });
    }

    fn remove(&mut self, collection: &str, id: &str) -> Option<StoredDocument> {
        self.collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(id))
    }
}

/// Checks that a write addresses a valid id and carries a document body.
pub(crate) fn validate_write(id: &str, data: &Bson) -> DocumentStoreResult<()> {
    if id.is_empty() || id.contains('/') {
        return Err(DocumentStoreError::InvalidArgument(format!("invalid document id {id:?}")));
    }

    if data.as_document().is_none() {
        return Err(DocumentStoreError::InvalidDocument(format!(
            "document {id} must be a document, got {data}"
        )));
    }

    Ok(())
}

fn project(data: &Bson, fields: &[String]) -> Bson {
    match data.as_document() {
        Some(document) => Bson::Document(
            document
                .iter()
                .filter(|(key, _)| fields.iter().any(|field| field == *key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Document>()
        ),
        None => data.clone(),
    }
}

/// Thread-safe, transactional in-memory document storage backend.
///
/// `InMemoryStore` is cheaply cloneable; clones share the same underlying data.
///
/// # Transactions
///
/// [`StoreBackend::run_atomic`] runs optimistically: reads record the revision they
/// observed, writes are staged, and the commit validates every read under the write
/// lock before applying the staged writes. A failed validation reruns the operation,
/// up to the configured number of attempts.
///
/// # Queries
///
/// Queries scan the collection in document id order; there is no indexing.
///
/// # Example
///
/// ```ignore
/// use ledgerdoc_memory::InMemoryStore;
/// use ledgerdoc::backend::StoreBackend;
/// use bson::{Bson, doc};
///
/// let store = InMemoryStore::new();
/// store.set_document("Transactions", "T1", Bson::Document(doc! { "type": "PURCHASE" })).await?;
/// let docs = store.get_documents("Transactions", vec!["T1".into()]).await?;
/// assert_eq!(docs.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    max_attempts: usize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store with the default retry policy.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Creates a builder for constructing an `InMemoryStore` with custom options.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    /// Number of attempts an atomic operation gets before it is aborted.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    type Writer = InMemoryBulkWriter;

    async fn get_document(&self, collection: &str, id: &str) -> DocumentStoreResult<DocumentSnapshot> {
        self.state
            .read()
            .await
            .document(collection, id)
            .map(|doc| DocumentSnapshot { id: id.to_string(), data: doc.data.clone() })
            .ok_or_else(|| DocumentStoreError::DocumentNotFound(id.to_string(), collection.to_string()))
    }

    async fn set_document(&self, collection: &str, id: &str, data: Bson) -> DocumentStoreResult<()> {
        validate_write(id, &data)?;

        self.state
            .write()
            .await
            .put(collection, id, data);

        Ok(())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> DocumentStoreResult<()> {
        self.state
            .write()
            .await
            .remove(collection, id)
            .map(|_| ())
            .ok_or_else(|| DocumentStoreError::DocumentNotFound(id.to_string(), collection.to_string()))
    }

    async fn get_documents(&self, collection: &str, ids: Vec<String>) -> DocumentStoreResult<Vec<DocumentSnapshot>> {
        let state = self.state.read().await;

        Ok(
            ids
                .into_iter()
                .filter_map(|id| {
                    state
                        .document(collection, &id)
                        .map(|doc| DocumentSnapshot { data: doc.data.clone(), id })
                })
                .collect()
        )
    }

    async fn query_documents(&self, collection: &str, query: Query) -> DocumentStoreResult<DocumentStream> {
        let state = self.state.read().await;
        let Some(documents) = state.collections.get(collection) else {
            return Ok(stream::empty().boxed());
        };

        let limit = query.limit.unwrap_or(usize::MAX);
        let mut matches = Vec::new();

        for (id, doc) in documents {
            if matches.len() >= limit {
                break;
            }

            if DocumentEvaluator::new(&doc.data).matches_all(&query.filters)? {
                let data = match &query.projection {
                    Some(fields) => project(&doc.data, fields),
                    None => doc.data.clone(),
                };

                matches.push(Ok(DocumentSnapshot { id: id.clone(), data }));
            }
        }

        Ok(stream::iter(matches).boxed())
    }

    async fn run_atomic<F, T>(&self, operation: F) -> DocumentStoreResult<T>
    where
        F: for<'t> Fn(&'t mut dyn AtomicTransaction) -> BoxFuture<'t, DocumentStoreResult<T>>
            + Send
            + Sync,
        T: Send,
    {
        for attempt in 1..=self.max_attempts {
            let mut transaction = MemoryTransaction::new(self.state.clone());
            let handle: &mut dyn AtomicTransaction = &mut transaction;
            let value = operation(handle).await?;

            match transaction.commit().await {
                Ok(()) => return Ok(value),
                Err(CommitError::Conflict { collection, id }) => {
                    debug!(
                        target: "ledgerdoc::memory",
                        attempt,
                        collection = %collection,
                        id = %id,
                        "Transaction conflict, retrying"
                    );
                },
                Err(CommitError::Failed(e)) => return Err(e),
            }
        }

        warn!(target: "ledgerdoc::memory", attempts = self.max_attempts, "Transaction aborted");

        Err(DocumentStoreError::TransactionAborted { attempts: self.max_attempts })
    }

    fn bulk_writer(&self, collection: &str) -> Self::Writer {
        InMemoryBulkWriter::new(self.state.clone(), collection.to_string())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// ```ignore
/// use ledgerdoc_memory::InMemoryStore;
/// use ledgerdoc::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder().max_attempts(10).build().await?;
/// ```
#[derive(Debug)]
pub struct InMemoryStoreBuilder {
    max_attempts: usize,
}

impl Default for InMemoryStoreBuilder {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS }
    }
}

impl InMemoryStoreBuilder {
    /// Sets how many times an atomic operation is attempted before it is aborted.
    /// Values below 1 are raised to 1.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        Ok(InMemoryStore {
            max_attempts: self.max_attempts,
            ..InMemoryStore::new()
        })
    }
}
