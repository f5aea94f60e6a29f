//! Error types and result types for document store operations.
//!
//! Every fallible operation in this crate returns [`DocumentStoreResult<T>`]. Errors
//! carry the offending id, collection, field or bound so a caller can diagnose the
//! failure without retrying blindly.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The requested document was not found in the collection.
    /// The first argument is the document ID, the second is the collection name.
    ///
    /// This is an expected outcome of a lookup, not an operation failure.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// A document that must not exist yet was already present at commit time.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The caller supplied an argument the operation cannot accept
    /// (unknown projection field, mismatched batch lengths, malformed time bound).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// The document violates schema constraints or has invalid structure.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An atomic operation kept conflicting with concurrent writers and the store
    /// gave up after its retry policy was exhausted.
    #[error("Transaction aborted after {attempts} attempt(s) due to conflicting writes")]
    TransactionAborted {
        /// Number of attempts the store made before giving up.
        attempts: usize,
    },
    /// Draining a query result failed part way through.
    #[error("Failed to iterate documents: {0}")]
    IterationFailure(#[source] Box<DocumentStoreError>),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

impl DocumentStoreError {
    /// Returns `true` for [`DocumentStoreError::DocumentNotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentStoreError::DocumentNotFound(..))
    }
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
