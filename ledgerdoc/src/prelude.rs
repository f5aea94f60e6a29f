//! Convenient re-exports of commonly used types from ledgerdoc.
//!
//! ```ignore
//! use ledgerdoc::prelude::*;
//! ```

pub use ledgerdoc_core::{
    backend::{AtomicTransaction, BulkWriter, DocumentSnapshot, StoreBackend, StoreBackendBuilder},
    collection::TypedCollection,
    config::TransactionDaoConfig,
    dao::TransactionDao,
    document::{Document, DocumentExt},
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, FieldOp, Filter, Query, QueryBuilder, QueryVisitor},
    record::{HistoryEntry, Record, RecordField, VersionedEntry},
    search::SearchRequest,
    store::DocumentStore,
};
