//! Query construction and filtering API for document stores.
//!
//! A [`Query`] is an ordered list of filter expressions (all of which must match),
//! an optional result limit and an optional field projection.
//!
//! # Query Building
//!
//! ```ignore
//! use ledgerdoc::query::{Query, Filter};
//!
//! let query = Query::builder()
//!     .filter(Filter::eq("accountId", "A1"))
//!     .filter(Filter::array_contains_any("onlineServices", vec!["NETFLIX", "SPOTIFY"]))
//!     .limit(10)
//!     .build();
//! ```
//!
//! # Filter Expression API
//!
//! The [`Filter`] struct provides one constructor per operator the store understands:
//!
//! - Comparison: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`
//! - Membership: `is_in`, `not_in`
//! - Array: `array_contains`, `array_contains_any`
//! - Logical: `and`, `or`
//!
//! The DAO's own search only emits a flat list of field filters, but the whole
//! vocabulary, `And`/`Or` included, is public API: callers compose their own queries
//! and run them through [`TypedCollection::query`](crate::collection::TypedCollection::query),
//! and backends evaluate or translate nested expressions with a [`QueryVisitor`].
//!
//! ```ignore
//! let disputed = store
//!     .typed_collection_at::<Record>("Transactions")
//!     .query(
//!         Query::builder()
//!             .filter(Filter::eq("accountId", "A1"))
//!             .filter(Filter::eq("type", "REFUND").or(Filter::eq("type", "CHARGEBACK")))
//!             .build(),
//!     )
//!     .await?;
//! ```
//!
//! There is no offset: the document stores this crate targets do not support
//! offset-based pagination.

use bson::Bson;

use crate::error::DocumentStoreError;

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Field value is one of the values in the given array.
    In,
    /// Field value is none of the values in the given array.
    NotIn,
    /// Array field contains the single given value.
    ArrayContains,
    /// Array field contains at least one of the values in the given array.
    ArrayContainsAny,
}

impl FieldOp {
    /// The operator as the store spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldOp::Eq => "==",
            FieldOp::Ne => "!=",
            FieldOp::Gt => ">",
            FieldOp::Gte => ">=",
            FieldOp::Lt => "<",
            FieldOp::Lte => "<=",
            FieldOp::In => "in",
            FieldOp::NotIn => "not-in",
            FieldOp::ArrayContains => "array-contains",
            FieldOp::ArrayContainsAny => "array-contains-any",
        }
    }
}

/// A filter expression for querying documents.
///
/// # Example
///
/// ```ignore
/// use ledgerdoc::query::Filter;
///
/// let expr = Filter::or(vec![
///     Filter::eq("type", "PURCHASE"),
///     Filter::eq("type", "REFUND"),
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Field comparison expression.
    Field {
        /// The field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    ///
    /// If this expression is already an OR, the other expression is appended
    /// to the list. Otherwise, a new OR expression is created.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }
}

/// A structured query for retrieving and filtering documents.
///
/// Filters are kept in the order they were added; a document matches when every
/// filter matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Filter expressions, applied in order.
    pub filters: Vec<Expr>,
    /// Maximum number of documents to return.
    pub limit: Option<usize>,
    /// Top-level fields to return. `None` returns whole documents.
    pub projection: Option<Vec<String>>,
}

impl Query {
    /// Creates a new empty query with no filters or limits.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }
}

/// Helper struct for constructing filter expressions.
///
/// All methods accept field names and values as `Into<String>` and `Into<Bson>`.
pub struct Filter;

impl Filter {
    /// Matches documents where the field equals the specified value.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Matches documents where the field does not equal the specified value.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    /// Matches documents where the field is greater than the specified value.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Matches documents where the field is greater than or equal to the specified value.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Matches documents where the field is less than the specified value.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Matches documents where the field is less than or equal to the specified value.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Matches documents where the field equals one of `values`.
    ///
    /// Stores cap the length of the list; staying under that cap is the caller's job.
    pub fn is_in(field: impl Into<String>, values: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::In, values.into())
    }

    /// Matches documents where the field equals none of `values`.
    pub fn not_in(field: impl Into<String>, values: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::NotIn, values.into())
    }

    /// Matches documents whose array field contains `value`.
    ///
    /// Takes exactly one value. Use [`Filter::array_contains_any`] for several.
    pub fn array_contains(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::ArrayContains, value.into())
    }

    /// Matches documents whose array field shares at least one element with `values`.
    pub fn array_contains_any(field: impl Into<String>, values: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::ArrayContainsAny, values.into())
    }

    /// Combines multiple expressions such that all must match.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Combines multiple expressions such that any can match.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Appends a filter expression. Filters keep the order they are added in.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.query.filters.push(filter);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Restricts the returned documents to the given top-level fields.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

pub trait QueryVisitor {
    type Output;
    type Error: Into<DocumentStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
        }
    }
}
