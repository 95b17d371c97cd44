use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, QueryTrait, Select, Statement, Value,
};

use crate::error::{QueryError, QueryResult};
use crate::query::{FieldValue, FilterOperator, QueryHandle};

/// Query handle over a SeaORM `Select`
///
/// Field names resolve to the entity's columns by their snake_case name.
/// Nothing touches the database until `count` or `execute`.
pub struct SeaOrmQuery<E: EntityTrait> {
    select: Select<E>,
    db: Arc<DatabaseConnection>,
}

impl<E: EntityTrait> SeaOrmQuery<E> {
    /// `SELECT * FROM <entity>` with no predicates
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self::from_select(E::find(), db)
    }

    /// Start from a prepared select (ordering, joins, base scopes)
    pub fn from_select(select: Select<E>, db: Arc<DatabaseConnection>) -> Self {
        Self { select, db }
    }

    pub fn select(&self) -> &Select<E> {
        &self.select
    }

    /// The statement this query would run on its connection's backend
    pub fn statement(&self) -> Statement {
        self.select.build(self.db.get_database_backend())
    }
}

impl<E: EntityTrait> Clone for SeaOrmQuery<E> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
            db: Arc::clone(&self.db),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for SeaOrmQuery<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeaOrmQuery")
            .field("statement", &self.statement().to_string())
            .finish()
    }
}

/// Largest LIMIT/OFFSET PostgreSQL binds (`BIGINT`); anything above it is
/// already past every row.
const MAX_BOUND: u64 = i64::MAX as u64;

/// `%text%` with `\`, `%` and `_` escaped so the text matches literally
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn resolve_column<E>(field: &str) -> QueryResult<E::Column>
where
    E: EntityTrait,
    E::Column: FromStr,
{
    E::Column::from_str(field).map_err(|_| QueryError::UnknownField(field.to_string()))
}

fn to_value(field: &str, value: FieldValue) -> QueryResult<Value> {
    match value {
        FieldValue::Bool(v) => Ok(v.into()),
        FieldValue::Int(v) => Ok(v.into()),
        FieldValue::Float(v) => Ok(v.into()),
        FieldValue::Text(v) => Ok(v.into()),
        FieldValue::Uuid(v) => Ok(v.into()),
        FieldValue::Timestamp(v) => Ok(v.into()),
        FieldValue::Null | FieldValue::List(_) => Err(QueryError::InvalidCriterion(format!(
            "{field}: expected a scalar value"
        ))),
    }
}

fn to_values(field: &str, items: Vec<FieldValue>) -> QueryResult<Vec<Value>> {
    items.into_iter().map(|item| to_value(field, item)).collect()
}

#[async_trait]
impl<E> QueryHandle for SeaOrmQuery<E>
where
    E: EntityTrait,
    E::Column: FromStr,
    E::Model: Send + Sync,
{
    type Record = E::Model;

    fn filter_by_field(
        self,
        field: &str,
        op: FilterOperator,
        value: FieldValue,
    ) -> QueryResult<Self> {
        let column = resolve_column::<E>(field)?;
        let Self { select, db } = self;

        let select = match (op, value) {
            (FilterOperator::IsNull, _) | (FilterOperator::Eq, FieldValue::Null) => {
                select.filter(column.is_null())
            }
            (FilterOperator::IsNotNull, _) | (FilterOperator::Ne, FieldValue::Null) => {
                select.filter(column.is_not_null())
            }
            (FilterOperator::In, FieldValue::List(items)) => {
                select.filter(column.is_in(to_values(field, items)?))
            }
            (FilterOperator::NotIn, FieldValue::List(items)) => {
                select.filter(column.is_not_in(to_values(field, items)?))
            }
            (FilterOperator::Contains, FieldValue::Text(text)) => {
                select.filter(column.like(LikeExpr::new(like_pattern(&text)).escape('\\')))
            }
            (FilterOperator::Eq, value) => select.filter(column.eq(to_value(field, value)?)),
            (FilterOperator::Ne, value) => select.filter(column.ne(to_value(field, value)?)),
            (FilterOperator::Gt, value) => select.filter(column.gt(to_value(field, value)?)),
            (FilterOperator::Gte, value) => select.filter(column.gte(to_value(field, value)?)),
            (FilterOperator::Lt, value) => select.filter(column.lt(to_value(field, value)?)),
            (FilterOperator::Lte, value) => select.filter(column.lte(to_value(field, value)?)),
            (op, value) => {
                return Err(QueryError::InvalidCriterion(format!(
                    "{field}: {op} cannot take {value:?}"
                )));
            }
        };

        Ok(Self { select, db })
    }

    fn limit(mut self, limit: u64) -> Self {
        self.select = QuerySelect::limit(self.select, limit.min(MAX_BOUND));
        self
    }

    fn offset(mut self, offset: u64) -> Self {
        self.select = QuerySelect::offset(self.select, offset.min(MAX_BOUND));
        self
    }

    async fn count(&self) -> QueryResult<u64> {
        Ok(self.select.clone().count(self.db.as_ref()).await?)
    }

    async fn execute(self) -> QueryResult<Vec<E::Model>> {
        Ok(self.select.all(self.db.as_ref()).await?)
    }
}
