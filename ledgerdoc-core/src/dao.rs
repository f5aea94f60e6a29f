//! Data access for transaction records.
//!
//! [`TransactionDao`] is the entry point callers use. Its operations are split by
//! concern:
//!
//! - point reads and writes, projected reads, deletes, search and history reads (this module)
//! - the versioned upsert that appends to a record's history ([`crate::versioned`])
//! - batched reads and buffered batched writes ([`crate::batch`])
//!
//! Every operation is an `async fn` that may be cancelled by dropping its future;
//! nothing is left partially applied when that happens.

use tracing::{debug, info};

use crate::{
    backend::{StoreBackend, subcollection_path},
    collection::TypedCollection,
    config::TransactionDaoConfig,
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Filter, Query},
    record::{HistoryEntry, Record, RecordField, VersionedEntry},
    search::SearchRequest,
    store::DocumentStore,
};

/// Versioned read/write access to transaction records.
///
/// # Example
///
/// ```ignore
/// use ledgerdoc::{prelude::*, memory::InMemoryStore};
///
/// let dao = TransactionDao::new(InMemoryStore::new());
/// dao.upsert_with_history("T1", record).await?;
/// let latest = dao.get("T1").await?;
/// ```
#[derive(Debug)]
pub struct TransactionDao<B: StoreBackend> {
    pub(crate) store: DocumentStore<B>,
    pub(crate) config: TransactionDaoConfig,
}

impl<B: StoreBackend> TransactionDao<B> {
    /// Creates a DAO over `backend` using the default collection names.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, TransactionDaoConfig::default())
    }

    pub fn with_config(backend: B, config: TransactionDaoConfig) -> Self {
        Self { store: DocumentStore::new(backend), config }
    }

    pub fn config(&self) -> &TransactionDaoConfig {
        &self.config
    }

    pub fn store(&self) -> &DocumentStore<B> {
        &self.store
    }

    pub(crate) fn records(&self) -> TypedCollection<'_, B, Record> {
        self.store.typed_collection_at(self.config.collection.as_str())
    }

    pub(crate) fn history_path(&self, id: &str) -> String {
        subcollection_path(&self.config.collection, id, &self.config.history_collection)
    }

    /// Fetches the full record stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if there is no such record.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<Record> {
        self.records()
            .get(id)
            .await
            .inspect_err(|e| {
                if e.is_not_found() {
                    debug!(target: "ledgerdoc::dao", id = %id, "Transaction not found");
                }
            })
    }

    /// Fetches only the requested fields of record `id`.
    ///
    /// `fields` are stored field names and must all be projectable (see
    /// [`RecordField::PROJECTABLE`]). The returned record carries `id` and the requested
    /// fields; every other field holds its default. An empty `fields` behaves exactly
    /// like [`TransactionDao::get`].
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] for an unknown or non-projectable
    /// field, checked before the store is contacted, and
    /// [`DocumentStoreError::DocumentNotFound`] if no record matches.
    pub async fn get_projected<S: AsRef<str>>(&self, id: &str, fields: &[S]) -> DocumentStoreResult<Record> {
        if fields.is_empty() {
            return self.get(id).await;
        }

        let fields = RecordField::parse_projection(fields)?;

        let query = Query::builder()
            .filter(Filter::eq(RecordField::Id.as_str(), id))
            .select(fields.iter().map(RecordField::as_str))
            .limit(1)
            .build();

        let mut record = self.records()
            .query(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                debug!(target: "ledgerdoc::dao", id = %id, "Transaction not found under projection");
                DocumentStoreError::DocumentNotFound(id.to_string(), self.config.collection.clone())
            })?;

        record.id = id.to_string();

        Ok(record)
    }

    /// Writes `record` as the full value of `id`, creating or overwriting it.
    ///
    /// No version is assigned and no history is written; `record.version` is stored as
    /// given, so it should come from a prior read rather than be invented by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] if `record.id` is set and differs
    /// from `id`.
    pub async fn upsert(&self, id: &str, record: Record) -> DocumentStoreResult<()> {
        let record = normalize_id(id, record)?;

        self.records()
            .set(id, &record)
            .await?;

        debug!(target: "ledgerdoc::dao", id = %id, "Upserted transaction");

        Ok(())
    }

    /// Deletes record `id`. Its history is left in place.
    pub async fn delete(&self, id: &str) -> DocumentStoreResult<()> {
        self.records()
            .delete(id)
            .await?;

        info!(target: "ledgerdoc::dao", id = %id, "Deleted transaction");

        Ok(())
    }

    /// Returns the records matching `request`.
    ///
    /// Results are drained eagerly. If draining fails part way through, the call fails
    /// with [`DocumentStoreError::IterationFailure`] and no partial results are
    /// returned.
    pub async fn search(&self, request: &SearchRequest) -> DocumentStoreResult<Vec<Record>> {
        if request.offset.is_some() {
            debug!(
                target: "ledgerdoc::dao",
                offset = ?request.offset,
                "Ignoring search offset, offset pagination is not supported"
            );
        }

        let query = request.to_query()?;
        let results = self.records()
            .query(query)
            .await?;

        debug!(target: "ledgerdoc::dao", count = results.len(), "Searched transactions");

        Ok(results)
    }

    /// Returns the history of record `id`, oldest version first.
    ///
    /// A record that was never written with history, or does not exist, has an empty
    /// history.
    pub async fn history(&self, id: &str) -> DocumentStoreResult<Vec<VersionedEntry>> {
        let mut entries = self.store
            .typed_collection_at::<HistoryEntry>(self.history_path(id))
            .query_with_ids(Query::new())
            .await?
            .into_iter()
            .map(|(key, entry)| {
                HistoryEntry::parse_key(&key)
                    .map(|version| VersionedEntry { version, entry })
                    .ok_or_else(|| {
                        DocumentStoreError::InvalidDocument(format!(
                            "unexpected history key {key:?} for transaction {id}"
                        ))
                    })
            })
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        entries.sort_by_key(|entry| entry.version);

        Ok(entries)
    }
}

/// Makes `record.id` agree with the id it is written under.
pub(crate) fn normalize_id(id: &str, mut record: Record) -> DocumentStoreResult<Record> {
    if id.is_empty() {
        return Err(DocumentStoreError::InvalidArgument("transaction id must not be empty".into()));
    }

    if record.id.is_empty() {
        record.id = id.to_string();
    } else if record.id != id {
        return Err(DocumentStoreError::InvalidArgument(format!(
            "record id {:?} does not match id {id:?}",
            record.id
        )));
    }

    Ok(record)
}
