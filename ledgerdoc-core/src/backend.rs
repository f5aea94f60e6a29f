//! Storage backend abstraction for the document store.
//!
//! This module defines the capability traits a concrete document database adapter
//! implements. Everything above this layer (typed collections, the transaction DAO)
//! is written against these traits only, so backends can be swapped freely and an
//! in-memory implementation can stand in for tests.
//!
//! # Traits
//!
//! - [`StoreBackend`]: point reads and writes, batched reads, filtered iteration,
//!   atomic read-modify-write and buffered bulk writes
//! - [`AtomicTransaction`]: the read/write handle passed to [`StoreBackend::run_atomic`]
//! - [`BulkWriter`]: a client-side write buffer with an explicit flush
//! - [`StoreBackendBuilder`]: factory trait for creating backend instances
//!
//! # Collection paths
//!
//! Collections are addressed by name. A sub-collection owned by a document is
//! addressed as `<collection>/<id>/<sub>`; see [`subcollection_path`].

use async_trait::async_trait;
use bson::Bson;
use futures::{future::BoxFuture, stream::BoxStream};
use std::fmt::Debug;

use crate::{error::DocumentStoreResult, query::Query};

/// A document as returned by the store: its id within the collection and its body.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// The document's id within its collection.
    pub id: String,
    /// The document body.
    pub data: Bson,
}

/// A lazily drained sequence of query results.
///
/// The stream ends when results are exhausted; an `Err` item is a failure, not
/// the end of the sequence.
pub type DocumentStream = BoxStream<'static, DocumentStoreResult<DocumentSnapshot>>;

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks.
///
/// # Cancellation
///
/// Dropping any returned future must not leave a partial write behind: atomic
/// operations either commit every staged write or none of them.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// The buffered writer returned by [`StoreBackend::bulk_writer`].
    type Writer: BulkWriter;

    /// Fetches a single document.
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound)
    /// if no document with `id` exists in `collection`.
    async fn get_document(&self, collection: &str, id: &str) -> DocumentStoreResult<DocumentSnapshot>;

    /// Writes `data` as the full value of the document, creating it if needed.
    async fn set_document(&self, collection: &str, id: &str, data: Bson) -> DocumentStoreResult<()>;

    /// Deletes a single document.
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound)
    /// if the document does not exist.
    async fn delete_document(&self, collection: &str, id: &str) -> DocumentStoreResult<()>;

    /// Fetches several documents in one round trip.
    ///
    /// The order of the returned snapshots is the store's, which need not match `ids`.
    /// Ids that do not exist are omitted.
    async fn get_documents(
        &self,
        collection: &str,
        ids: Vec<String>,
    ) -> DocumentStoreResult<Vec<DocumentSnapshot>>;

    /// Runs a filtered query and returns a lazy stream over the matches.
    async fn query_documents(
        &self,
        collection: &str,
        query: Query,
    ) -> DocumentStoreResult<DocumentStream>;

    /// Executes `operation` as one atomic unit and returns the value produced by the
    /// attempt that committed.
    ///
    /// The operation receives a fresh [`AtomicTransaction`] for each attempt. If the
    /// store detects a conflicting concurrent write at commit time it runs the
    /// operation again according to its own retry policy, and returns
    /// [`DocumentStoreError::TransactionAborted`](crate::error::DocumentStoreError::TransactionAborted)
    /// once that policy is exhausted. An error returned by the operation itself
    /// aborts the transaction immediately and is returned unchanged.
    ///
    /// Because it may run more than once, `operation` must not have side effects
    /// outside the transaction handle.
    async fn run_atomic<F, T>(&self, operation: F) -> DocumentStoreResult<T>
    where
        F: for<'t> Fn(&'t mut dyn AtomicTransaction) -> BoxFuture<'t, DocumentStoreResult<T>>
            + Send
            + Sync,
        T: Send;

    /// Creates an empty write buffer for `collection`.
    ///
    /// Nothing reaches the store until [`BulkWriter::flush`] is called.
    fn bulk_writer(&self, collection: &str) -> Self::Writer;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

/// Read/write handle for one attempt of an atomic operation.
///
/// Reads must come before writes. Writes are staged on the handle and only become
/// visible when the store commits the whole attempt.
#[async_trait]
pub trait AtomicTransaction: Send {
    /// Reads a document, returning `None` if it does not exist.
    async fn get(&mut self, collection: &str, id: &str) -> DocumentStoreResult<Option<Bson>>;

    /// Stages a full overwrite of a document.
    fn set(&mut self, collection: &str, id: &str, data: Bson) -> DocumentStoreResult<()>;

    /// Stages the creation of a document that must not exist yet.
    ///
    /// The commit fails with
    /// [`DocumentStoreError::DocumentAlreadyExists`](crate::error::DocumentStoreError::DocumentAlreadyExists)
    /// if it does.
    fn create(&mut self, collection: &str, id: &str, data: Bson) -> DocumentStoreResult<()>;
}

/// A client-side buffer of document writes bound to one collection.
///
/// Flushing is never automatic: writes that are still buffered when the writer is
/// dropped are discarded. A writer is owned by a single caller; it is not meant to be
/// shared between concurrent producers.
#[async_trait]
pub trait BulkWriter: Send {
    /// Buffers a full overwrite of document `id`.
    ///
    /// Fails without buffering anything if the write is malformed.
    fn set(&mut self, id: &str, data: Bson) -> DocumentStoreResult<()>;

    /// Number of writes buffered since the last flush.
    fn pending(&self) -> usize;

    /// Commits every buffered write as a single group and empties the buffer.
    async fn flush(&mut self) -> DocumentStoreResult<()>;
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}

/// Returns the path of the sub-collection `sub` owned by document `id` of `collection`.
pub fn subcollection_path(collection: &str, id: &str, sub: &str) -> String {
    format!("{collection}/{id}/{sub}")
}
