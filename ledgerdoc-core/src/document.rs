//! Core traits for document representation and serialization.
//!
//! Any owned serde type that can move between tasks is a [`Document`]; the blanket
//! [`DocumentExt`] implementation converts it to and from the store's BSON form and
//! the JSON form used at API boundaries. Where a document lives is decided by the
//! caller (see [`DocumentStore::typed_collection_at`](crate::store::DocumentStore::typed_collection_at)),
//! not by the type, since the same type can be stored under many sub-collection paths.

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Value, from_value, to_value};

use crate::error::DocumentStoreResult;

/// Values that can be stored in and read back from a document store.
///
/// Implemented for every type meeting the bounds.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {}

impl<T> Document for T where T: Serialize + DeserializeOwned + Send + Sync + Clone + 'static {}

/// Extension trait providing serialization/deserialization utilities for documents.
///
/// This trait is automatically implemented for all types that implement [`Document`].
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value for storage.
    fn to_bson(&self) -> DocumentStoreResult<Bson>;

    /// Creates a document from a BSON value.
    fn from_bson(bson: Bson) -> DocumentStoreResult<Self>;

    /// Converts this document to a JSON value.
    fn to_json(&self) -> DocumentStoreResult<Value>;

    /// Creates a document from a JSON value.
    fn from_json(value: Value) -> DocumentStoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> DocumentStoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> DocumentStoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }

    fn to_json(&self) -> DocumentStoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> DocumentStoreResult<Self> {
        Ok(from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HistoryEntry;

    #[test]
    fn history_entry_converts_without_an_id() {
        let entry = HistoryEntry { kind: "REFUND".into(), ..Default::default() };

        let bson = entry.to_bson().unwrap();
        assert!(!bson.as_document().unwrap().contains_key("id"));
        assert_eq!(HistoryEntry::from_bson(bson).unwrap(), entry);
    }
}
