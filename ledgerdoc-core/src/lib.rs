//! Versioned data access for transaction records stored in a transactional document
//! database.
//!
//! This crate is the core of the ledgerdoc project and provides:
//!
//! - **Store backend abstraction** ([`backend`]) - The capabilities a document database adapter provides
//! - **Query and filtering API** ([`query`]) - Ordered filter lists, limits and projections
//! - **Typed collections** ([`collection`], [`store`]) - Serialization on top of a backend
//! - **Record model** ([`record`]) - Transaction records, history snapshots and field names
//! - **Transaction DAO** ([`dao`], [`versioned`], [`batch`]) - Point, versioned and batched access
//! - **Search** ([`search`]) - Translating a search request into a store query
//! - **Configuration** ([`config`]) - Collection names
//! - **Error handling** ([`error`]) - Error types and result types
//!
//! # Example
//!
//! ```ignore
//! use ledgerdoc::{prelude::*, memory::InMemoryStore};
//!
//! let dao = TransactionDao::new(InMemoryStore::new());
//!
//! dao.upsert_with_history("T1", Record {
//!     account_id: "A1".into(),
//!     kind: "PURCHASE".into(),
//!     ..Default::default()
//! }).await?;
//!
//! let history = dao.history("T1").await?;
//! assert_eq!(history[0].version, 1);
//! ```

#[allow(unused_extern_crates)]
extern crate self as ledgerdoc_core;

pub mod backend;
pub mod batch;
pub mod collection;
pub mod config;
pub mod dao;
pub mod document;
pub mod error;
pub mod query;
pub mod record;
pub mod search;
pub mod store;
pub mod versioned;
