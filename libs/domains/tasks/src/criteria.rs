//! Task filters expressed as reusable criteria
//!
//! Each type validates its parameters on construction and, when applied,
//! adds predicates on the task's column names. They work with any
//! [`QueryHandle`], so the same filter runs against PostgreSQL and the
//! in-memory repository.

use chrono::{DateTime, Utc};
use query_filter::{
    Criterion, FieldValue, FilterOperator, QueryError, QueryHandle, QueryResult, RangeCriterion,
};
use uuid::Uuid;

use crate::models::{TaskPriority, TaskStatus};

fn dedup<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

/// Status is one of the given values
#[derive(Debug, Clone, PartialEq)]
pub struct StatusIn(Vec<TaskStatus>);

impl StatusIn {
    pub fn new(statuses: impl IntoIterator<Item = TaskStatus>) -> QueryResult<Self> {
        let statuses = dedup(statuses);
        if statuses.is_empty() {
            return Err(QueryError::InvalidCriterion(
                "status filter needs at least one status".to_string(),
            ));
        }
        Ok(Self(statuses))
    }

    pub fn statuses(&self) -> &[TaskStatus] {
        &self.0
    }
}

impl<Q: QueryHandle> Criterion<Q> for StatusIn {
    fn apply(&self, query: Q) -> QueryResult<Q> {
        let values: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        query.filter_by_field("status", FilterOperator::In, values.into())
    }
}

/// Priority is one of the given values
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityIn(Vec<TaskPriority>);

impl PriorityIn {
    pub fn new(priorities: impl IntoIterator<Item = TaskPriority>) -> QueryResult<Self> {
        let priorities = dedup(priorities);
        if priorities.is_empty() {
            return Err(QueryError::InvalidCriterion(
                "priority filter needs at least one priority".to_string(),
            ));
        }
        Ok(Self(priorities))
    }

    pub fn priorities(&self) -> &[TaskPriority] {
        &self.0
    }
}

impl<Q: QueryHandle> Criterion<Q> for PriorityIn {
    fn apply(&self, query: Q) -> QueryResult<Q> {
        let values: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        query.filter_by_field("priority", FilterOperator::In, values.into())
    }
}

/// Task belongs to the given owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnerIs(pub Uuid);

impl<Q: QueryHandle> Criterion<Q> for OwnerIs {
    fn apply(&self, query: Q) -> QueryResult<Q> {
        query.filter_by_field("owner_id", FilterOperator::Eq, self.0.into())
    }
}

/// Task is attached to the given project
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectIs(pub Uuid);

impl<Q: QueryHandle> Criterion<Q> for ProjectIs {
    fn apply(&self, query: Q) -> QueryResult<Q> {
        query.filter_by_field("project_id", FilterOperator::Eq, self.0.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionIs(pub bool);

impl<Q: QueryHandle> Criterion<Q> for CompletionIs {
    fn apply(&self, query: Q) -> QueryResult<Q> {
        query.filter_by_field("completed", FilterOperator::Eq, self.0.into())
    }
}

/// Due date falls inside an inclusive window; either end may be open
#[derive(Debug, Clone, PartialEq)]
pub struct DueBetween(RangeCriterion);

impl DueBetween {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> QueryResult<Self> {
        RangeCriterion::new(
            "due_date",
            from.map(FieldValue::from),
            to.map(FieldValue::from),
        )
        .map(Self)
    }
}

impl<Q: QueryHandle> Criterion<Q> for DueBetween {
    fn apply(&self, query: Q) -> QueryResult<Q> {
        self.0.apply(query)
    }
}

/// Title contains the given text
#[derive(Debug, Clone, PartialEq)]
pub struct TitleContains(String);

impl TitleContains {
    pub fn new(text: impl Into<String>) -> QueryResult<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(QueryError::InvalidCriterion(
                "search text must not be blank".to_string(),
            ));
        }
        Ok(Self(text))
    }
}

impl<Q: QueryHandle> Criterion<Q> for TitleContains {
    fn apply(&self, query: Q) -> QueryResult<Q> {
        query.filter_by_field("title", FilterOperator::Contains, self.0.clone().into())
    }
}
