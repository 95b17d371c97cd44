use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};
use crate::query::{FieldValue, FilterOperator, QueryHandle};

/// A single reusable filter predicate
///
/// Implementations read only their own construction parameters and never
/// run the query. Parameter validation belongs in the constructor so a bad
/// criterion fails before any query is built.
pub trait Criterion<Q: QueryHandle>: fmt::Debug + Send + Sync {
    fn apply(&self, query: Q) -> QueryResult<Q>;
}

/// Ordered, immutable composition of criteria
///
/// Criteria are applied strictly in insertion order, left to right. The
/// set never reorders or deduplicates, so two range filters on the same
/// field are applied exactly as they were added.
pub struct CriteriaSet<Q: QueryHandle> {
    criteria: Vec<Arc<dyn Criterion<Q>>>,
}

impl<Q: QueryHandle> CriteriaSet<Q> {
    pub fn empty() -> Self {
        Self {
            criteria: Vec::new(),
        }
    }

    /// New set with `criterion` appended; `self` is left untouched
    pub fn add(&self, criterion: impl Criterion<Q> + 'static) -> Self {
        self.clone().with(criterion)
    }

    /// Append in place, consuming the set (builder style)
    pub fn with(mut self, criterion: impl Criterion<Q> + 'static) -> Self {
        self.criteria.push(Arc::new(criterion));
        self
    }

    /// New set holding `self`'s criteria followed by `other`'s
    pub fn merge(&self, other: &CriteriaSet<Q>) -> Self {
        self.criteria
            .iter()
            .chain(other.criteria.iter())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Criterion<Q>>> {
        self.criteria.iter()
    }

    /// Fold every criterion over `query`, stopping at the first error
    pub fn apply_all(&self, query: Q) -> QueryResult<Q> {
        self.criteria
            .iter()
            .try_fold(query, |query, criterion| criterion.apply(query))
    }
}

impl<Q: QueryHandle> Clone for CriteriaSet<Q> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
        }
    }
}

impl<Q: QueryHandle> Default for CriteriaSet<Q> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Q: QueryHandle> fmt::Debug for CriteriaSet<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.criteria.iter()).finish()
    }
}

impl<Q: QueryHandle> FromIterator<Arc<dyn Criterion<Q>>> for CriteriaSet<Q> {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Criterion<Q>>>>(iter: I) -> Self {
        Self {
            criteria: iter.into_iter().collect(),
        }
    }
}

/// `field <op> value` against any query handle
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCriterion {
    field: String,
    op: FilterOperator,
    value: FieldValue,
}

impl FieldCriterion {
    pub fn new(
        field: impl Into<String>,
        op: FilterOperator,
        value: impl Into<FieldValue>,
    ) -> QueryResult<Self> {
        let field = field.into();
        let value = value.into();

        if field.trim().is_empty() {
            return Err(QueryError::InvalidCriterion(
                "field name must not be empty".to_string(),
            ));
        }

        match (op, &value) {
            (FilterOperator::In | FilterOperator::NotIn, FieldValue::List(items)) => {
                if items.is_empty() {
                    return Err(QueryError::InvalidCriterion(format!(
                        "{field}: {op} requires at least one value"
                    )));
                }
                if items
                    .iter()
                    .any(|item| matches!(item, FieldValue::Null | FieldValue::List(_)))
                {
                    return Err(QueryError::InvalidCriterion(format!(
                        "{field}: {op} values must be scalars"
                    )));
                }
            }
            (FilterOperator::In | FilterOperator::NotIn, _) => {
                return Err(QueryError::InvalidCriterion(format!(
                    "{field}: {op} requires a list of values"
                )));
            }
            (FilterOperator::Contains, FieldValue::Text(text)) => {
                if text.is_empty() {
                    return Err(QueryError::InvalidCriterion(format!(
                        "{field}: contains requires a non-empty pattern"
                    )));
                }
            }
            (FilterOperator::Contains, _) => {
                return Err(QueryError::InvalidCriterion(format!(
                    "{field}: contains requires a text value"
                )));
            }
            (FilterOperator::IsNull | FilterOperator::IsNotNull, FieldValue::Null) => {}
            (FilterOperator::IsNull | FilterOperator::IsNotNull, _) => {
                return Err(QueryError::InvalidCriterion(format!(
                    "{field}: {op} takes no value"
                )));
            }
            (_, FieldValue::List(_)) => {
                return Err(QueryError::InvalidCriterion(format!(
                    "{field}: {op} does not accept a list"
                )));
            }
            (op, FieldValue::Null) if op.is_ordering() => {
                return Err(QueryError::InvalidCriterion(format!(
                    "{field}: cannot order against null"
                )));
            }
            _ => {}
        }

        Ok(Self { field, op, value })
    }

    /// `field IS NULL`
    pub fn is_null(field: impl Into<String>) -> QueryResult<Self> {
        Self::new(field, FilterOperator::IsNull, FieldValue::Null)
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> FilterOperator {
        self.op
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

impl<Q: QueryHandle> Criterion<Q> for FieldCriterion {
    fn apply(&self, query: Q) -> QueryResult<Q> {
        query.filter_by_field(&self.field, self.op, self.value.clone())
    }
}

/// Inclusive `lower <= field <= upper`, either bound optional
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCriterion {
    field: String,
    lower: Option<FieldValue>,
    upper: Option<FieldValue>,
}

impl RangeCriterion {
    pub fn new(
        field: impl Into<String>,
        lower: Option<FieldValue>,
        upper: Option<FieldValue>,
    ) -> QueryResult<Self> {
        let field = field.into();

        if field.trim().is_empty() {
            return Err(QueryError::InvalidCriterion(
                "field name must not be empty".to_string(),
            ));
        }

        for bound in lower.iter().chain(upper.iter()) {
            if matches!(bound, FieldValue::Null | FieldValue::List(_)) {
                return Err(QueryError::InvalidCriterion(format!(
                    "{field}: range bounds must be scalars"
                )));
            }
        }

        match (&lower, &upper) {
            (None, None) => {
                return Err(QueryError::InvalidCriterion(format!(
                    "{field}: range needs at least one bound"
                )));
            }
            (Some(lo), Some(hi)) => match lo.compare(hi) {
                Some(Ordering::Greater) => {
                    return Err(QueryError::InvalidCriterion(format!(
                        "{field}: lower bound is greater than upper bound"
                    )));
                }
                None => {
                    return Err(QueryError::InvalidCriterion(format!(
                        "{field}: range bounds are not comparable"
                    )));
                }
                _ => {}
            },
            _ => {}
        }

        Ok(Self {
            field,
            lower,
            upper,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn lower(&self) -> Option<&FieldValue> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&FieldValue> {
        self.upper.as_ref()
    }
}

impl<Q: QueryHandle> Criterion<Q> for RangeCriterion {
    fn apply(&self, mut query: Q) -> QueryResult<Q> {
        if let Some(lower) = &self.lower {
            query = query.filter_by_field(&self.field, FilterOperator::Gte, lower.clone())?;
        }
        if let Some(upper) = &self.upper {
            query = query.filter_by_field(&self.field, FilterOperator::Lte, upper.clone())?;
        }
        Ok(query)
    }
}
