//! The transaction record, its history snapshot and the field identifiers used to
//! address both in filters and projections.

use bson::DateTime;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// Default name of the collection holding transaction records.
pub const TRANSACTION_COLLECTION: &str = "Transactions";

/// Default name of the per-record history sub-collection.
pub const HISTORY_COLLECTION: &str = "history";

/// A versioned transaction record.
///
/// Every field has a default so that projected reads, which only carry a subset of
/// fields, deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub account_id: String,
    pub card_number: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub online_services: BTreeSet<String>,
    pub posted_time: DateTime,
    /// Assigned by [`TransactionDao::upsert_with_history`](crate::dao::TransactionDao::upsert_with_history).
    pub version: i64,
    pub last_updated: DateTime,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            id: String::new(),
            account_id: String::new(),
            card_number: String::new(),
            kind: String::new(),
            online_services: BTreeSet::new(),
            posted_time: DateTime::from_millis(0),
            version: 0,
            last_updated: DateTime::from_millis(0),
        }
    }
}

/// Immutable snapshot written to a record's history on every versioned upsert.
///
/// Version and last-updated time are not part of the snapshot; the version is the
/// snapshot's key instead (see [`HistoryEntry::key`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryEntry {
    pub account_id: String,
    pub card_number: String,
    pub online_services: BTreeSet<String>,
    pub posted_time: DateTime,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Default for HistoryEntry {
    fn default() -> Self {
        HistoryEntry::from(&Record::default())
    }
}

impl HistoryEntry {
    const KEY_PREFIX: &'static str = "version_";

    /// The document id under which the snapshot for `version` is stored.
    pub fn key(version: i64) -> String {
        format!("{}{version}", Self::KEY_PREFIX)
    }

    /// Parses a document id produced by [`HistoryEntry::key`].
    pub fn parse_key(key: &str) -> Option<i64> {
        key.strip_prefix(Self::KEY_PREFIX)?.parse().ok()
    }
}

impl From<&Record> for HistoryEntry {
    fn from(record: &Record) -> Self {
        Self {
            account_id: record.account_id.clone(),
            card_number: record.card_number.clone(),
            online_services: record.online_services.clone(),
            posted_time: record.posted_time,
            kind: record.kind.clone(),
        }
    }
}

/// A history snapshot together with the version it was recorded under.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedEntry {
    pub version: i64,
    pub entry: HistoryEntry,
}

/// Stored field names of a [`Record`].
///
/// Filters and projections name fields through this enum rather than string
/// literals; [`RecordField::as_str`] is the one place the stored spelling lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordField {
    Id,
    AccountId,
    CardNumber,
    Type,
    OnlineServices,
    PostedTime,
    Version,
    LastUpdated,
}

impl RecordField {
    /// Every field, in declaration order.
    pub const ALL: [RecordField; 8] = [
        RecordField::Id,
        RecordField::AccountId,
        RecordField::CardNumber,
        RecordField::Type,
        RecordField::OnlineServices,
        RecordField::PostedTime,
        RecordField::Version,
        RecordField::LastUpdated,
    ];

    /// Fields a caller may request in a projected read.
    pub const PROJECTABLE: [RecordField; 5] = [
        RecordField::AccountId,
        RecordField::CardNumber,
        RecordField::OnlineServices,
        RecordField::PostedTime,
        RecordField::Type,
    ];

    /// The field name as stored in the document.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::AccountId => "accountId",
            RecordField::CardNumber => "cardNumber",
            RecordField::Type => "type",
            RecordField::OnlineServices => "onlineServices",
            RecordField::PostedTime => "postedTime",
            RecordField::Version => "version",
            RecordField::LastUpdated => "lastUpdated",
        }
    }

    pub fn is_projectable(&self) -> bool {
        Self::PROJECTABLE.contains(self)
    }

    /// Validates caller-supplied projection field names.
    ///
    /// Duplicates are collapsed. Fails on the first name that is unknown or not
    /// projectable.
    pub fn parse_projection<S: AsRef<str>>(fields: &[S]) -> DocumentStoreResult<Vec<RecordField>> {
        let mut parsed = Vec::with_capacity(fields.len());

        for name in fields {
            let field: RecordField = name.as_ref().parse()?;

            if !field.is_projectable() {
                return Err(DocumentStoreError::InvalidArgument(format!(
                    "field {field} is not projectable"
                )));
            }

            if !parsed.contains(&field) {
                parsed.push(field);
            }
        }

        Ok(parsed)
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = DocumentStoreError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| {
                DocumentStoreError::InvalidArgument(format!("unknown field {name:?}"))
            })
    }
}
