//! Main ledgerdoc crate providing versioned data access to transaction records.
//!
//! This crate is the primary entry point for users of ledgerdoc. It re-exports the
//! core types and functionality from the sub-crates and provides access to the
//! bundled storage backend.
//!
//! # Features
//!
//! - **Versioned upserts** - Every versioned write appends an immutable history snapshot
//! - **Projected reads** - Fetch a subset of a record's fields
//! - **Batched access** - Batched reads and buffered, explicitly flushed batched writes
//! - **Search** - Filter by account, type, posting time range and online services
//! - **Pluggable backends** - Anything implementing [`backend::StoreBackend`]
//!
//! # Quick Start
//!
//! ```ignore
//! use ledgerdoc::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> DocumentStoreResult<()> {
//!     let dao = TransactionDao::new(InMemoryStore::builder().build().await?);
//!
//!     dao.upsert_with_history("T1", Record {
//!         account_id: "A1".into(),
//!         kind: "PURCHASE".into(),
//!         ..Default::default()
//!     }).await?;
//!
//!     dao.upsert_with_history("T1", Record {
//!         account_id: "A1".into(),
//!         kind: "REFUND".into(),
//!         ..Default::default()
//!     }).await?;
//!
//!     // The record lags its newest history label by one.
//!     assert_eq!(dao.get("T1").await?.version, 1);
//!     assert_eq!(dao.history("T1").await?.len(), 2);
//!
//!     let refunds = dao
//!         .search(&SearchRequest {
//!             account_id: Some("A1".into()),
//!             types: vec!["REFUND".into()],
//!             ..Default::default()
//!         })
//!         .await?;
//!     assert_eq!(refunds.len(), 1);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Transactional in-memory storage for development and testing

pub mod prelude;

pub use ledgerdoc_core::{
    backend, batch, collection, config, dao, document, error, query, record, search, store, versioned,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use ledgerdoc_memory::{DEFAULT_MAX_ATTEMPTS, InMemoryBulkWriter, InMemoryStore, InMemoryStoreBuilder};
}
