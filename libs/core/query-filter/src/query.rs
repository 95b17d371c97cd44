use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::error::QueryResult;

/// Comparison operators understood by every query handle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    /// Substring match on text fields
    Contains,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    /// Operators whose operand is a list of candidate values
    pub fn takes_list(&self) -> bool {
        matches!(self, FilterOperator::In | FilterOperator::NotIn)
    }

    /// Operators that test for presence and carry no operand
    pub fn is_null_check(&self) -> bool {
        matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }

    /// Ordering comparisons
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte
        )
    }
}

/// A typed operand for [`QueryHandle::filter_by_field`]
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Order two scalar values of compatible kinds.
    ///
    /// Integers and floats compare numerically with each other. Anything
    /// else across kinds, `Null` and lists are incomparable.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;

        match (self, other) {
            (Bool(a), Bool(b)) => Some(a.cmp(b)),
            (Int(a), Int(b)) => Some(a.cmp(b)),
            (Float(a), Float(b)) => a.partial_cmp(b),
            (Int(a), Float(b)) => (*a as f64).partial_cmp(b),
            (Float(a), Int(b)) => a.partial_cmp(&(*b as f64)),
            (Text(a), Text(b)) => Some(a.cmp(b)),
            (Uuid(a), Uuid(b)) => Some(a.cmp(b)),
            (Timestamp(a), Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Value equality with numeric widening; `Null` only equals `Null`
    pub fn matches(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Collaborator-owned representation of a query that has not run yet
///
/// Builder methods consume the handle and return a refined one; only
/// [`count`](QueryHandle::count) and [`execute`](QueryHandle::execute)
/// touch the backing store.
#[async_trait]
pub trait QueryHandle: Send + Sync + Sized {
    /// Row type materialized by [`execute`](QueryHandle::execute)
    type Record: Send;

    /// Narrow the query with a single field predicate
    fn filter_by_field(
        self,
        field: &str,
        op: FilterOperator,
        value: FieldValue,
    ) -> QueryResult<Self>;

    fn limit(self, limit: u64) -> Self;

    fn offset(self, offset: u64) -> Self;

    /// Number of rows the query currently matches, ignoring limit/offset
    async fn count(&self) -> QueryResult<u64>;

    /// Run the query and materialize its rows
    async fn execute(self) -> QueryResult<Vec<Self::Record>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_operator_string_forms() {
        assert_eq!(FilterOperator::NotIn.to_string(), "not_in");
        assert_eq!(
            FilterOperator::from_str("is_not_null").unwrap(),
            FilterOperator::IsNotNull
        );
        assert!(FilterOperator::from_str("between").is_err());
    }

    #[test]
    fn test_numeric_widening() {
        assert!(FieldValue::Int(3).matches(&FieldValue::Float(3.0)));
        assert_eq!(
            FieldValue::Float(2.5).compare(&FieldValue::Int(3)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_incomparable_kinds() {
        assert_eq!(FieldValue::from("1").compare(&FieldValue::Int(1)), None);
        assert_eq!(FieldValue::Null.compare(&FieldValue::Null), None);
        assert!(FieldValue::Null.matches(&FieldValue::Null));
        assert!(!FieldValue::Null.matches(&FieldValue::Int(0)));
    }

    #[test]
    fn test_option_and_vec_conversions() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(5i64)), FieldValue::Int(5));
        assert_eq!(
            FieldValue::from(vec!["a", "b"]),
            FieldValue::List(vec![FieldValue::from("a"), FieldValue::from("b")])
        );
    }
}
