//! Point reads, projected reads, plain upserts and deletes.

mod common;

use common::{dao, posted, record, services};
use ledgerdoc::{memory::InMemoryStore, prelude::*};

// ============================================================================
// Round Trip
// ============================================================================

#[tokio::test]
async fn test_upsert_then_get_returns_every_written_field() {
    let dao = dao();
    let written = Record {
        id: "T1".into(),
        online_services: services(&["NETFLIX", "SPOTIFY"]),
        posted_time: posted("2024-01-01T10:00:00Z"),
        version: 4,
        ..record("A1", "PURCHASE")
    };

    dao.upsert("T1", written.clone()).await.unwrap();

    assert_eq!(dao.get("T1").await.unwrap(), written);
}

#[tokio::test]
async fn test_upsert_overwrites_whole_record() {
    let dao = dao();
    let first = Record {
        online_services: services(&["NETFLIX"]),
        ..record("A1", "PURCHASE")
    };

    dao.upsert("T1", first).await.unwrap();
    dao.upsert("T1", record("A2", "REFUND")).await.unwrap();

    let stored = dao.get("T1").await.unwrap();
    assert_eq!(stored.account_id, "A2");
    assert_eq!(stored.kind, "REFUND");
    assert!(stored.online_services.is_empty(), "upsert must not merge");
}

#[tokio::test]
async fn test_get_missing_is_not_found() {
    let dao = dao();

    let err = dao.get("T404").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, DocumentStoreError::DocumentNotFound(ref id, ref coll) if id == "T404" && coll == "Transactions"));
}

// ============================================================================
// Id Normalization
// ============================================================================

#[tokio::test]
async fn test_upsert_fills_empty_record_id() {
    let dao = dao();

    dao.upsert("T1", record("A1", "PURCHASE")).await.unwrap();

    assert_eq!(dao.get("T1").await.unwrap().id, "T1");
}

#[tokio::test]
async fn test_upsert_rejects_mismatched_record_id() {
    let dao = dao();
    let mismatched = Record { id: "T2".into(), ..record("A1", "PURCHASE") };

    assert!(matches!(dao.upsert("T1", mismatched).await, Err(DocumentStoreError::InvalidArgument(_))));
    assert!(dao.get("T1").await.unwrap_err().is_not_found());
    assert!(dao.get("T2").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_upsert_rejects_empty_id() {
    let dao = dao();

    assert!(matches!(dao.upsert("", record("A1", "PURCHASE")).await, Err(DocumentStoreError::InvalidArgument(_))));
}

// ============================================================================
// Projected Reads
// ============================================================================

async fn seeded() -> TransactionDao<InMemoryStore> {
    let dao = dao();
    let full = Record {
        online_services: services(&["HULU"]),
        posted_time: posted("2024-02-03T04:05:06Z"),
        ..record("A1", "PURCHASE")
    };
    dao.upsert("T1", full).await.unwrap();
    dao
}

#[tokio::test]
async fn test_get_projected_returns_only_requested_fields() {
    let dao = seeded().await;

    let projected = dao.get_projected("T1", &["accountId", "type"]).await.unwrap();

    assert_eq!(projected.id, "T1");
    assert_eq!(projected.account_id, "A1");
    assert_eq!(projected.kind, "PURCHASE");
    assert_eq!(projected.card_number, "");
    assert!(projected.online_services.is_empty());
    assert_eq!(projected.posted_time, Record::default().posted_time);
}

#[tokio::test]
async fn test_get_projected_accepts_every_projectable_field() {
    let dao = seeded().await;
    let fields: Vec<&str> = RecordField::PROJECTABLE.iter().map(RecordField::as_str).collect();

    let projected = dao.get_projected("T1", &fields).await.unwrap();

    assert_eq!(projected.card_number, "4111111111111111");
    assert_eq!(projected.online_services, services(&["HULU"]));
    assert_eq!(projected.posted_time, posted("2024-02-03T04:05:06Z"));
}

#[tokio::test]
async fn test_get_projected_unknown_field_is_invalid_argument() {
    let dao = seeded().await;

    let err = dao.get_projected("T1", &["accountId", "merchant"]).await.unwrap_err();
    assert!(matches!(err, DocumentStoreError::InvalidArgument(ref msg) if msg.contains("merchant")));

    // Rejected before the store is consulted, so the id does not matter.
    assert!(matches!(
        dao.get_projected("T404", &["merchant"]).await,
        Err(DocumentStoreError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn test_get_projected_rejects_non_projectable_field() {
    let dao = seeded().await;

    for field in ["version", "lastUpdated", "id"] {
        assert!(
            matches!(dao.get_projected("T1", &[field]).await, Err(DocumentStoreError::InvalidArgument(_))),
            "{field} must not be projectable"
        );
    }
}

#[tokio::test]
async fn test_get_projected_without_fields_is_a_full_get() {
    let dao = seeded().await;
    let no_fields: [&str; 0] = [];

    assert_eq!(dao.get_projected("T1", &no_fields).await.unwrap(), dao.get("T1").await.unwrap());
}

#[tokio::test]
async fn test_get_projected_missing_id_is_not_found() {
    let dao = seeded().await;

    assert!(dao.get_projected("T2", &["type"]).await.unwrap_err().is_not_found());
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_removes_record_and_keeps_history() {
    let dao = dao();
    dao.upsert_with_history("T1", record("A1", "PURCHASE")).await.unwrap();

    dao.delete("T1").await.unwrap();

    assert!(dao.get("T1").await.unwrap_err().is_not_found());
    assert_eq!(dao.history("T1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_missing_is_not_found() {
    let dao = dao();

    assert!(dao.delete("T1").await.unwrap_err().is_not_found());
}

// ============================================================================
// Configuration
// ============================================================================

#[tokio::test]
async fn test_collections_follow_configuration() {
    let config: TransactionDaoConfig = serde_json::from_str(r#"{ "collection": "Ledger" }"#).unwrap();
    assert_eq!(config.history_collection, "history");

    let dao = TransactionDao::with_config(InMemoryStore::new(), config);
    dao.upsert_with_history("T1", record("A1", "PURCHASE")).await.unwrap();

    let backend = dao.store().backend();
    assert!(backend.get_document("Ledger", "T1").await.is_ok());
    assert!(backend.get_document("Ledger/T1/history", "version_1").await.is_ok());
    assert!(backend.get_document("Transactions", "T1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_store_shuts_down_cleanly() {
    let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());

    store.shutdown().await.unwrap();
}
