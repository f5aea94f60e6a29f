//! Typed, collection-scoped access to a storage backend.
//!
//! A [`TypedCollection`] serializes documents on the way in and deserializes them on
//! the way out, and turns the backend's lazy query stream into a vector.
//!
//! # Example
//!
//! ```ignore
//! # async fn example(store: &ledgerdoc::store::DocumentStore<impl ledgerdoc::backend::StoreBackend>) -> ledgerdoc::error::DocumentStoreResult<()> {
//! use ledgerdoc::record::Record;
//!
//! let transactions = store.typed_collection_at::<Record>("Transactions");
//! transactions.set("T1", &Record { id: "T1".into(), ..Default::default() }).await?;
//! let found = transactions.get_many(vec!["T1".to_string()]).await?;
//! # Ok(()) }
//! ```

use futures::TryStreamExt;
use std::marker::PhantomData;

use crate::{
    backend::{DocumentSnapshot, StoreBackend},
    document::{Document, DocumentExt},
    error::{DocumentStoreError, DocumentStoreResult},
    query::Query,
};

#[derive(Debug)]
pub struct TypedCollection<'a, B: StoreBackend, D: Document> {
    name: String,
    backend: &'a B,
    _marker: PhantomData<D>,
}

impl<'a, B: StoreBackend, D: Document> TypedCollection<'a, B, D> {
    pub(crate) fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend, _marker: PhantomData }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Retrieves a single document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if the document does not exist,
    /// or a serialization error if it cannot be decoded as `D`.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<D> {
        let snapshot = self.backend
            .get_document(self.name(), id)
            .await?;

        D::from_bson(snapshot.data)
    }

    /// Writes `document` as the full value of `id`, creating or overwriting it.
    pub async fn set(&self, id: &str, document: &D) -> DocumentStoreResult<()> {
        self.backend
            .set_document(self.name(), id, document.to_bson()?)
            .await
    }

    /// Deletes document `id`.
    pub async fn delete(&self, id: &str) -> DocumentStoreResult<()> {
        self.backend
            .delete_document(self.name(), id)
            .await
    }

    /// Retrieves several documents in one round trip.
    ///
    /// # Returns
    ///
    /// The documents found, in the backend's order. Ids that don't exist are omitted.
    pub async fn get_many(&self, ids: Vec<String>) -> DocumentStoreResult<Vec<D>> {
        self.backend
            .get_documents(self.name(), ids)
            .await?
            .into_iter()
            .map(|snapshot| D::from_bson(snapshot.data))
            .collect::<DocumentStoreResult<Vec<D>>>()
    }

    /// Runs `query` and drains every result.
    ///
    /// # Errors
    ///
    /// Any error raised while draining the result stream aborts the call and is returned
    /// as [`DocumentStoreError::IterationFailure`]; documents read before the failure
    /// are discarded.
    pub async fn query(&self, query: Query) -> DocumentStoreResult<Vec<D>> {
        self.query_snapshots(query)
            .await?
            .into_iter()
            .map(|snapshot| D::from_bson(snapshot.data))
            .collect::<DocumentStoreResult<Vec<D>>>()
    }

    /// Like [`TypedCollection::query`], but keeps each document's id alongside it.
    pub async fn query_with_ids(&self, query: Query) -> DocumentStoreResult<Vec<(String, D)>> {
        self.query_snapshots(query)
            .await?
            .into_iter()
            .map(|snapshot| D::from_bson(snapshot.data).map(|doc| (snapshot.id, doc)))
            .collect::<DocumentStoreResult<Vec<_>>>()
    }

    async fn query_snapshots(&self, query: Query) -> DocumentStoreResult<Vec<DocumentSnapshot>> {
        self.backend
            .query_documents(self.name(), query)
            .await?
            .map_err(|e| DocumentStoreError::IterationFailure(Box::new(e)))
            .try_collect::<Vec<_>>()
            .await
    }
}
