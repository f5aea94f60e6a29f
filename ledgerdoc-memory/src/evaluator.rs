//! Query expression evaluation for in-memory document filtering.
//!
//! This module provides the evaluation engine for query expressions,
//! enabling filtering and comparison operations on BSON documents.

use bson::{Bson, datetime::DateTime};
use std::{cmp::Ordering, collections::HashMap};

use ledgerdoc_core::{
    error::{DocumentStoreError, DocumentStoreResult},
    query::{Expr, FieldOp, QueryVisitor},
};

/// Type-erased, comparable representation of BSON values.
///
/// Numeric types are normalized to f64 so that an `Int32` filter value matches an
/// `Int64` field.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    Null,
    Bool(bool),
    Number(f64),
    DateTime(DateTime),
    String(&'a str),
    Array(Vec<Comparable<'a>>),
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr
                    .iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>()
            ),
            Bson::Document(doc) => Comparable::Map(
                doc
                    .iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>()
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

pub(crate) struct DocumentEvaluator<'a> {
    document: &'a Bson,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a Bson) -> Self {
        Self { document }
    }

    /// Returns whether the document satisfies every filter.
    pub fn matches_all(&mut self, filters: &[Expr]) -> DocumentStoreResult<bool> {
        self.visit_and(filters)
    }
}

/// The values an `in`/`not-in`/`array-contains-any` filter was given.
fn value_list<'v>(op: &FieldOp, value: &'v Bson) -> DocumentStoreResult<&'v Vec<Bson>> {
    value.as_array().ok_or_else(|| {
        DocumentStoreError::InvalidArgument(format!(
            "operator {} requires an array value, got {value}",
            op.as_str()
        ))
    })
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = DocumentStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> Result<Self::Output, Self::Error> {
        // Documents missing the field never match, whatever the operator.
        let Some(field_value) = self.document
            .as_document()
            .and_then(|doc| doc.get(field))
        else {
            return Ok(false);
        };

        let left = Comparable::from(field_value);

        match op {
            FieldOp::Eq => Ok(left == Comparable::from(value)),
            FieldOp::Ne => Ok(left != Comparable::from(value)),
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                match left.partial_cmp(&Comparable::from(value)) {
                    Some(ordering) => Ok(match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        _ => ordering != Ordering::Greater,
                    }),
                    None => Ok(false),
                }
            },
            FieldOp::In => Ok(
                value_list(op, value)?
                    .iter()
                    .any(|candidate| left == Comparable::from(candidate))
            ),
            FieldOp::NotIn => Ok(
                !value_list(op, value)?
                    .iter()
                    .any(|candidate| left == Comparable::from(candidate))
            ),
            FieldOp::ArrayContains => match left {
                Comparable::Array(items) => {
                    let needle = Comparable::from(value);
                    Ok(items.iter().any(|item| item == &needle))
                },
                _ => Ok(false),
            },
            FieldOp::ArrayContainsAny => {
                let candidates = value_list(op, value)?;

                match left {
                    Comparable::Array(items) => Ok(
                        candidates
                            .iter()
                            .map(Comparable::from)
                            .any(|candidate| items.contains(&candidate))
                    ),
                    _ => Ok(false),
                }
            },
        }
    }
}
