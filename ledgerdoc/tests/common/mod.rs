//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::{StreamExt, future::BoxFuture, stream};
use ledgerdoc::{
    backend::DocumentStream,
    bson::{Bson, DateTime},
    memory::{InMemoryBulkWriter, InMemoryStore},
    prelude::*,
};
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .try_init();
}

pub fn dao() -> TransactionDao<InMemoryStore> {
    init_tracing();
    TransactionDao::new(InMemoryStore::new())
}

pub fn record(account_id: &str, kind: &str) -> Record {
    Record {
        account_id: account_id.into(),
        card_number: "4111111111111111".into(),
        kind: kind.into(),
        ..Default::default()
    }
}

pub fn posted(rfc3339: &str) -> DateTime {
    let parsed = chrono::DateTime::parse_from_rfc3339(rfc3339).unwrap();
    DateTime::from_chrono(parsed.with_timezone(&chrono::Utc))
}

pub fn services(names: &[&str]) -> std::collections::BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Delegates to an [`InMemoryStore`], injecting the faults it is configured with.
#[derive(Debug, Clone, Default)]
pub struct FaultyStore {
    pub inner: InMemoryStore,
    /// Break every query stream after its first item.
    pub broken_queries: bool,
    /// Sleep this long at the start of every bulk flush.
    pub flush_delay: Duration,
}

impl FaultyStore {
    pub fn with_broken_queries() -> Self {
        Self { broken_queries: true, ..Default::default() }
    }

    pub fn with_flush_delay(flush_delay: Duration) -> Self {
        Self { flush_delay, ..Default::default() }
    }
}

#[derive(Debug)]
pub struct DelayedWriter {
    inner: InMemoryBulkWriter,
    delay: Duration,
}

#[async_trait]
impl BulkWriter for DelayedWriter {
    fn set(&mut self, id: &str, data: Bson) -> DocumentStoreResult<()> {
        self.inner.set(id, data)
    }

    fn pending(&self) -> usize {
        self.inner.pending()
    }

    async fn flush(&mut self) -> DocumentStoreResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.flush().await
    }
}

#[async_trait]
impl StoreBackend for FaultyStore {
    type Writer = DelayedWriter;

    async fn get_document(&self, collection: &str, id: &str) -> DocumentStoreResult<DocumentSnapshot> {
        self.inner.get_document(collection, id).await
    }

    async fn set_document(&self, collection: &str, id: &str, data: Bson) -> DocumentStoreResult<()> {
        self.inner.set_document(collection, id, data).await
    }

    async fn delete_document(&self, collection: &str, id: &str) -> DocumentStoreResult<()> {
        self.inner.delete_document(collection, id).await
    }

    async fn get_documents(&self, collection: &str, ids: Vec<String>) -> DocumentStoreResult<Vec<DocumentSnapshot>> {
        self.inner.get_documents(collection, ids).await
    }

    async fn query_documents(&self, collection: &str, query: Query) -> DocumentStoreResult<DocumentStream> {
        let results = self.inner.query_documents(collection, query).await?;
        if !self.broken_queries {
            return Ok(results);
        }

        let failure = stream::iter(vec![Err(DocumentStoreError::Backend("connection reset".into()))]);

        Ok(results.take(1).chain(failure).boxed())
    }

    async fn run_atomic<F, T>(&self, operation: F) -> DocumentStoreResult<T>
    where
        F: for<'t> Fn(&'t mut dyn AtomicTransaction) -> BoxFuture<'t, DocumentStoreResult<T>>
            + Send
            + Sync,
        T: Send,
    {
        self.inner.run_atomic(operation).await
    }

    fn bulk_writer(&self, collection: &str) -> Self::Writer {
        DelayedWriter {
            inner: self.inner.bulk_writer(collection),
            delay: self.flush_delay,
        }
    }
}
