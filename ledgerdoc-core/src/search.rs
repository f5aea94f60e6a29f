//! Translation of a structured [`SearchRequest`] into a store [`Query`].
//!
//! Clauses are emitted in a fixed order, and only for request fields that are
//! present:
//!
//! 1. `accountId` equality
//! 2. `type` membership (`in`)
//! 3. `postedTime` half-open range `[startTime, endTime)`, only when both bounds are given
//! 4. result limit, only when greater than zero
//! 5. `onlineServices` any-of (`array-contains-any`)

use bson::DateTime;
use chrono::{DateTime as ChronoDateTime, Utc};
use serde::Deserialize;

use crate::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Filter, Query},
    record::RecordField,
};

/// Criteria for [`TransactionDao::search`](crate::dao::TransactionDao::search).
///
/// Empty strings and empty lists count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
    /// Exact account id to match.
    pub account_id: Option<String>,
    /// Transaction types to match; a record matches if its type is any of these.
    /// Stores cap the length of this list (30 for common ones).
    pub types: Vec<String>,
    /// Inclusive lower bound on `postedTime`, RFC 3339.
    pub start_time: Option<String>,
    /// Exclusive upper bound on `postedTime`, RFC 3339.
    pub end_time: Option<String>,
    /// Online services to match; a record matches if it has any of these.
    pub online_services: Vec<String>,
    /// Maximum number of results. `None` or `Some(0)` means unlimited.
    pub limit: Option<usize>,
    /// Accepted for forward compatibility but has no effect: the backing stores do
    /// not support offset-based pagination.
    pub offset: Option<usize>,
}

impl SearchRequest {
    /// Builds the store query for this request.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidArgument`] naming the bound if either
    /// time bound is not valid RFC 3339.
    pub fn to_query(&self) -> DocumentStoreResult<Query> {
        let mut builder = Query::builder();

        if let Some(account_id) = non_empty(&self.account_id) {
            builder = builder.filter(Filter::eq(RecordField::AccountId.as_str(), account_id));
        }

        if !self.types.is_empty() {
            builder = builder.filter(Filter::is_in(RecordField::Type.as_str(), self.types.clone()));
        }

        if let (Some(start), Some(end)) = (non_empty(&self.start_time), non_empty(&self.end_time)) {
            let start = parse_bound("start time", start)?;
            let end = parse_bound("end time", end)?;

            builder = builder
                .filter(Filter::gte(RecordField::PostedTime.as_str(), start))
                .filter(Filter::lt(RecordField::PostedTime.as_str(), end));
        }

        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            builder = builder.limit(limit);
        }

        // A single-value array-contains would only accept one service.
        if !self.online_services.is_empty() {
            builder = builder.filter(Filter::array_contains_any(
                RecordField::OnlineServices.as_str(),
                self.online_services.clone(),
            ));
        }

        Ok(builder.build())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_bound(label: &str, value: &str) -> DocumentStoreResult<DateTime> {
    ChronoDateTime::parse_from_rfc3339(value)
        .map(|parsed| DateTime::from_chrono(parsed.with_timezone(&Utc)))
        .map_err(|e| DocumentStoreError::InvalidArgument(format!("invalid {label} {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Expr, FieldOp};

    fn ops(query: &Query) -> Vec<(String, FieldOp)> {
        query
            .filters
            .iter()
            .map(|expr| match expr {
                Expr::Field { field, op, .. } => (field.clone(), *op),
                other => panic!("unexpected expression {other:?}"),
            })
            .collect()
    }

    #[test]
    fn empty_request_produces_empty_query() {
        assert_eq!(SearchRequest::default().to_query().unwrap(), Query::default());
    }

    #[test]
    fn full_request_emits_clauses_in_order() {
        let request = SearchRequest {
            account_id: Some("A1".into()),
            types: vec!["PURCHASE".into(), "REFUND".into()],
            start_time: Some("2024-01-01T00:00:00Z".into()),
            end_time: Some("2024-02-01T00:00:00Z".into()),
            online_services: vec!["NETFLIX".into()],
            limit: Some(25),
            offset: Some(50),
        };

        let query = request.to_query().unwrap();

        assert_eq!(
            ops(&query),
            vec![
                ("accountId".to_string(), FieldOp::Eq),
                ("type".to_string(), FieldOp::In),
                ("postedTime".to_string(), FieldOp::Gte),
                ("postedTime".to_string(), FieldOp::Lt),
                ("onlineServices".to_string(), FieldOp::ArrayContainsAny),
            ]
        );
        assert_eq!(query.limit, Some(25));
        assert_eq!(query.projection, None);
    }

    #[test]
    fn time_range_requires_both_bounds() {
        let only_start = SearchRequest {
            start_time: Some("2024-01-01T00:00:00Z".into()),
            ..Default::default()
        };
        let only_end = SearchRequest {
            end_time: Some("2024-01-01T00:00:00Z".into()),
            ..Default::default()
        };
        let empty_end = SearchRequest {
            start_time: Some("2024-01-01T00:00:00Z".into()),
            end_time: Some(String::new()),
            ..Default::default()
        };

        for request in [only_start, only_end, empty_end] {
            assert!(request.to_query().unwrap().filters.is_empty());
        }
    }

    #[test]
    fn time_range_bounds_are_parsed_as_datetimes() {
        let request = SearchRequest {
            start_time: Some("2024-01-01T00:00:00+02:00".into()),
            end_time: Some("2024-01-02T00:00:00Z".into()),
            ..Default::default()
        };

        let query = request.to_query().unwrap();

        assert_eq!(
            query.filters[0],
            Filter::gte("postedTime", DateTime::from_millis(1_704_060_000_000))
        );
        assert_eq!(
            query.filters[1],
            Filter::lt("postedTime", DateTime::from_millis(1_704_153_600_000))
        );
    }

    #[test]
    fn malformed_bound_is_named_in_error() {
        let bad_start = SearchRequest {
            start_time: Some("yesterday".into()),
            end_time: Some("2024-01-02T00:00:00Z".into()),
            ..Default::default()
        };
        let bad_end = SearchRequest {
            start_time: Some("2024-01-01T00:00:00Z".into()),
            end_time: Some("2024-13-02T00:00:00Z".into()),
            ..Default::default()
        };

        match bad_start.to_query() {
            Err(DocumentStoreError::InvalidArgument(msg)) => assert!(msg.contains("start time")),
            other => panic!("expected invalid argument, got {other:?}"),
        }
        match bad_end.to_query() {
            Err(DocumentStoreError::InvalidArgument(msg)) => assert!(msg.contains("end time")),
            other => panic!("expected invalid argument, got {other:?}"),
        }
    }

    #[test]
    fn multiple_services_use_any_of() {
        let request = SearchRequest {
            online_services: vec!["A".into(), "B".into()],
            ..Default::default()
        };

        let query = request.to_query().unwrap();

        assert_eq!(
            query.filters,
            vec![Filter::array_contains_any("onlineServices", vec!["A", "B"])]
        );
    }

    #[test]
    fn zero_limit_and_offset_are_ignored() {
        let request = SearchRequest {
            limit: Some(0),
            offset: Some(10),
            account_id: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(request.to_query().unwrap(), Query::default());
    }

    #[test]
    fn deserializes_from_camel_case_json() {
        let request: SearchRequest = serde_json::from_str(
            r#"{"accountId": "A1", "types": ["PURCHASE"], "limit": 10}"#,
        )
        .unwrap();

        assert_eq!(request.account_id.as_deref(), Some("A1"));
        assert_eq!(request.types, vec!["PURCHASE".to_string()]);
        assert_eq!(request.limit, Some(10));
        assert_eq!(request.offset, None);
    }
}
