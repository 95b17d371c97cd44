use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{QueryError, QueryResult};
use crate::query::{FieldValue, FilterOperator, QueryHandle};

/// Records that expose named fields to [`InMemoryQuery`]
pub trait Filterable {
    /// Names accepted by [`field_value`](Filterable::field_value)
    fn filterable_fields() -> &'static [&'static str];

    /// Current value of `field`; `None` for unknown fields
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

#[derive(Debug, Clone, PartialEq)]
struct Predicate {
    field: String,
    op: FilterOperator,
    value: FieldValue,
}

impl Predicate {
    /// SQL-like semantics: a null field only satisfies `IS NULL`
    /// (and `= NULL`, which backends translate to `IS NULL`).
    fn matches<R: Filterable>(&self, record: &R) -> bool {
        let actual = record
            .field_value(&self.field)
            .unwrap_or(FieldValue::Null);

        match self.op {
            FilterOperator::IsNull => actual.is_null(),
            FilterOperator::IsNotNull => !actual.is_null(),
            FilterOperator::Eq if self.value.is_null() => actual.is_null(),
            FilterOperator::Ne if self.value.is_null() => !actual.is_null(),
            _ if actual.is_null() => false,
            FilterOperator::Eq => actual.matches(&self.value),
            FilterOperator::Ne => !actual.matches(&self.value),
            FilterOperator::Gt => actual.compare(&self.value) == Some(Ordering::Greater),
            FilterOperator::Gte => matches!(
                actual.compare(&self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOperator::Lt => actual.compare(&self.value) == Some(Ordering::Less),
            FilterOperator::Lte => matches!(
                actual.compare(&self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            FilterOperator::In => self
                .value
                .as_list()
                .is_some_and(|items| items.iter().any(|item| actual.matches(item))),
            FilterOperator::NotIn => self
                .value
                .as_list()
                .is_some_and(|items| !items.iter().any(|item| actual.matches(item))),
            FilterOperator::Contains => match (&actual, &self.value) {
                (FieldValue::Text(haystack), FieldValue::Text(needle)) => {
                    haystack.contains(needle.as_str())
                }
                _ => false,
            },
        }
    }
}

/// Query handle over an in-process collection
///
/// Rows are shared behind an `Arc`, so building and cloning queries never
/// copies the data set. Matching rows are cloned only by `execute`.
pub struct InMemoryQuery<R> {
    rows: Arc<Vec<R>>,
    predicates: Vec<Predicate>,
    limit: Option<u64>,
    offset: u64,
}

impl<R> InMemoryQuery<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self::shared(Arc::new(rows))
    }

    pub fn shared(rows: Arc<Vec<R>>) -> Self {
        Self {
            rows,
            predicates: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    /// Number of predicates applied so far
    pub fn predicate_count(&self) -> usize {
        self.predicates.len()
    }
}

impl<R: Filterable> InMemoryQuery<R> {
    fn matching(&self) -> impl Iterator<Item = &R> {
        self.rows
            .iter()
            .filter(|row| self.predicates.iter().all(|p| p.matches(*row)))
    }
}

impl<R> Clone for InMemoryQuery<R> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            predicates: self.predicates.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<R> PartialEq for InMemoryQuery<R> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
            && self.predicates == other.predicates
            && self.limit == other.limit
            && self.offset == other.offset
    }
}

impl<R> fmt::Debug for InMemoryQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryQuery")
            .field("rows", &self.rows.len())
            .field("predicates", &self.predicates)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

#[async_trait]
impl<R> QueryHandle for InMemoryQuery<R>
where
    R: Filterable + Clone + Send + Sync + 'static,
{
    type Record = R;

    fn filter_by_field(
        mut self,
        field: &str,
        op: FilterOperator,
        value: FieldValue,
    ) -> QueryResult<Self> {
        if !R::filterable_fields().contains(&field) {
            return Err(QueryError::UnknownField(field.to_string()));
        }

        self.predicates.push(Predicate {
            field: field.to_string(),
            op,
            value,
        });
        Ok(self)
    }

    fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    async fn count(&self) -> QueryResult<u64> {
        Ok(self.matching().count() as u64)
    }

    async fn execute(self) -> QueryResult<Vec<R>> {
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = self
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(self.matching().skip(skip).take(take).cloned().collect())
    }
}
