//! The versioned upsert: an atomic write of a record together with an immutable
//! history snapshot.
//!
//! # Versioning
//!
//! One attempt of the transaction does the following, as a single atomic unit:
//!
//! 1. Read the main record and take its stored `version` (0 when absent).
//! 2. Starting there, walk the history forward while `version_<current + 1>` exists.
//!    The last label found is the current version. After a versioned upsert this is
//!    one step past `stored`; after a plain upsert, a batched write or a delete rewound
//!    `stored`, the walk catches up with the existing history.
//! 3. `new = current + 1`.
//! 4. Store `current` as the record's `version` and stamp `lastUpdated`.
//! 5. Overwrite the main record.
//! 6. Create history entry `version_<new>` holding a snapshot of the record being
//!    written.
//!
//! So after the k-th versioned upsert of a record its `version` is `k - 1` and its
//! history is `version_1 ..= version_k`: the main record lags the newest history
//! label by one. Every label read during the walk, including the missing one that ends
//! it, joins the transaction's read set, so a concurrent writer appending history forces
//! a retry. History entries are created, never overwritten: if the target label exists
//! at commit time the transaction fails with
//! [`DocumentStoreError::DocumentAlreadyExists`](crate::error::DocumentStoreError::DocumentAlreadyExists)
//! and nothing is written.

use bson::{Bson, DateTime};
use tracing::{info, warn};

use crate::{
    backend::StoreBackend,
    dao::{TransactionDao, normalize_id},
    document::DocumentExt,
    error::{DocumentStoreError, DocumentStoreResult},
    record::{HistoryEntry, Record, RecordField},
};

impl<B: StoreBackend> TransactionDao<B> {
    /// Writes `record` under `id` and appends a history snapshot, atomically.
    ///
    /// Returns the version stored on the record, which is one less than the label of
    /// the history entry just written.
    ///
    /// The version and last-updated time on `record` are overwritten; callers never
    /// assign versions themselves. Conflicting concurrent writers are resolved by the
    /// store's retry policy.
    ///
    /// # Errors
    ///
    /// - [`DocumentStoreError::TransactionAborted`] if the store gave up retrying
    /// - [`DocumentStoreError::DocumentAlreadyExists`] if the target history label is taken
    /// - [`DocumentStoreError::InvalidArgument`] if `record.id` is set and differs from `id`
    pub async fn upsert_with_history(&self, id: &str, record: Record) -> DocumentStoreResult<i64> {
        let record = normalize_id(id, record)?;
        let collection = self.config.collection.clone();
        let history = self.history_path(id);

        let result = self.store
            .backend()
            .run_atomic(|tx| {
                let mut record = record.clone();
                let collection = collection.clone();
                let history = history.clone();

                Box::pin(async move {
                    let stored = match tx.get(&collection, &record.id).await? {
                        Some(document) => stored_version(&document)?,
                        None => 0,
                    };

                    let mut current = stored;
                    while tx.get(&history, &HistoryEntry::key(current + 1)).await?.is_some() {
                        current += 1;
                    }
                    let next = current + 1;

                    record.version = current;
                    record.last_updated = DateTime::now();

                    tx.set(&collection, &record.id, record.to_bson()?)?;
                    tx.create(&history, &HistoryEntry::key(next), HistoryEntry::from(&record).to_bson()?)?;

                    Ok::<_, DocumentStoreError>(current)
                })
            })
            .await;

        let version = result.inspect_err(|e| {
            warn!(target: "ledgerdoc::dao", id = %id, error = %e, "Versioned upsert failed");
        })?;

        info!(target: "ledgerdoc::dao", id = %id, version, "Upserted transaction with history");

        Ok(version)
    }
}

fn stored_version(document: &Bson) -> DocumentStoreResult<i64> {
    let field = RecordField::Version.as_str();

    match document.as_document().and_then(|doc| doc.get(field)) {
        None | Some(Bson::Null) => Ok(0),
        Some(Bson::Int64(version)) if *version >= 0 => Ok(*version),
        Some(Bson::Int32(version)) if *version >= 0 => Ok(i64::from(*version)),
        Some(other) => Err(DocumentStoreError::InvalidDocument(format!(
            "field {field} holds {other}, expected a non-negative integer"
        ))),
    }
}
