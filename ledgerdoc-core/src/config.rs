//! Configuration for [`TransactionDao`](crate::dao::TransactionDao).

use serde::Deserialize;

use crate::record::{HISTORY_COLLECTION, TRANSACTION_COLLECTION};

/// Where the DAO keeps records and their history.
///
/// Deserializable so it can be embedded in an application's own configuration file;
/// missing keys fall back to the defaults.
///
/// ```ignore
/// let config = TransactionDaoConfig::default().with_collection("StagingTransactions");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionDaoConfig {
    /// Collection holding the main records. Defaults to `Transactions`.
    pub collection: String,
    /// Name of the sub-collection under each record holding its history.
    /// Defaults to `history`.
    pub history_collection: String,
}

impl Default for TransactionDaoConfig {
    fn default() -> Self {
        Self {
            collection: TRANSACTION_COLLECTION.to_string(),
            history_collection: HISTORY_COLLECTION.to_string(),
        }
    }
}

impl TransactionDaoConfig {
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_history_collection(mut self, history_collection: impl Into<String>) -> Self {
        self.history_collection = history_collection.into();
        self
    }
}
