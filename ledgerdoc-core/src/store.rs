//! Main document store interface for interacting with document backends.
//!
//! [`DocumentStore`] owns a backend and hands out typed, collection-scoped views of it.
//!
//! # Example
//!
//! ```ignore
//! use ledgerdoc::store::DocumentStore;
//! use ledgerdoc::record::Record;
//!
//! let store = DocumentStore::new(backend);
//! let transactions = store.typed_collection_at::<Record>("Transactions");
//! let record = transactions.get("T1").await?;
//! ```

use crate::{
    backend::StoreBackend,
    collection::TypedCollection,
    document::Document,
    error::DocumentStoreResult,
};

/// A strongly-typed document store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Gets a typed collection stored under an explicit name or sub-collection path.
    pub fn typed_collection_at<'a, D: Document>(&'a self, name: impl Into<String>) -> TypedCollection<'a, B, D> {
        TypedCollection::new(name.into(), &self.backend)
    }

    /// Shuts down the store and releases backend resources.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}
