//! Batched reads and buffered batched writes of transaction records.

use tracing::{debug, info};

use crate::{
    backend::{BulkWriter, StoreBackend},
    dao::{TransactionDao, normalize_id},
    document::DocumentExt,
    error::{DocumentStoreError, DocumentStoreResult},
    record::Record,
};

impl<B: StoreBackend> TransactionDao<B> {
    /// Fetches several records in one round trip.
    ///
    /// The result holds one record per id the store found, in the store's order, which
    /// need not match `ids`; re-sort by [`Record::id`] if alignment matters. Ids the store
    /// does not find are handled however the store reports them: omitted by stores that
    /// skip missing documents, or an error from stores that fail on them.
    pub async fn get_many(&self, ids: &[&str]) -> DocumentStoreResult<Vec<Record>> {
        let records = self.records()
            .get_many(ids.iter().map(|id| id.to_string()).collect())
            .await?;

        debug!(
            target: "ledgerdoc::dao",
            requested = ids.len(),
            found = records.len(),
            "Fetched transactions"
        );

        Ok(records)
    }

    /// Writes `records[i]` under `ids[i]` for every pair, as one grouped commit.
    ///
    /// The writes go into a fresh buffer owned by this call, which is flushed exactly
    /// once after every pair has been buffered. No version is assigned and no history
    /// is written.
    ///
    /// # Errors
    ///
    /// - [`DocumentStoreError::InvalidArgument`] if the lengths differ; nothing is written
    /// - the first error raised while buffering a pair (for example a record whose id
    ///   disagrees with its key); the buffer is abandoned without flushing, so nothing
    ///   is written
    /// - the flush error, if the grouped commit fails
    pub async fn set_many(&self, ids: &[&str], records: Vec<Record>) -> DocumentStoreResult<()> {
        if ids.len() != records.len() {
            return Err(DocumentStoreError::InvalidArgument(format!(
                "the number of ids ({}) does not match the number of records ({})",
                ids.len(),
                records.len()
            )));
        }

        let mut writer = self.store
            .backend()
            .bulk_writer(&self.config.collection);

        for (id, record) in ids.iter().zip(records) {
            let record = normalize_id(id, record)?;
            writer.set(id, record.to_bson()?)?;
        }

        let count = writer.pending();
        writer.flush().await?;

        info!(target: "ledgerdoc::dao", count, "Upserted transactions in bulk");

        Ok(())
    }
}
