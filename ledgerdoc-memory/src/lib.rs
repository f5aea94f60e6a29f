//! In-memory document storage backend for ledgerdoc.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses an async-aware read-write lock for concurrent access and is meant for
//! development and tests.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Optimistic transactions** - Revision-checked commits with a bounded retry policy
//! - **Filtered queries** - Every operator of the query vocabulary, plus limits and projections
//! - **Bulk writes** - Buffered writes applied as one group on flush
//!
//! # Quick Start
//!
//! ```ignore
//! use ledgerdoc::{prelude::*, memory::InMemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = InMemoryStore::builder().max_attempts(10).build().await?;
//!     let dao = TransactionDao::new(backend);
//!
//!     let version = dao.upsert_with_history("T1", Record {
//!         account_id: "A1".into(),
//!         kind: "PURCHASE".into(),
//!         ..Default::default()
//!     }).await?;
//!     assert_eq!(version, 0);
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as ledgerdoc_memory;

mod evaluator;
pub mod store;
mod transaction;
mod writer;

pub use store::{DEFAULT_MAX_ATTEMPTS, InMemoryStore, InMemoryStoreBuilder};
pub use writer::InMemoryBulkWriter;
