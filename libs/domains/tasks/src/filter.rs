use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use query_filter::{CriteriaSet, QueryHandle, RawInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::criteria::{
    CompletionIs, DueBetween, OwnerIs, PriorityIn, ProjectIs, StatusIn, TitleContains,
};
use crate::error::{TaskError, TaskResult};
use crate::models::{TaskPriority, TaskStatus};

/// Query filters for listing tasks
///
/// Built from raw request input with [`TaskFilter::from_raw_map`]. Keys that
/// are not filters (such as `page`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub owner_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub statuses: Option<Vec<TaskStatus>>,
    pub priorities: Option<Vec<TaskPriority>>,
    pub completed: Option<bool>,
    pub due_from: Option<DateTime<Utc>>,
    pub due_to: Option<DateTime<Utc>>,
    pub search: Option<String>,
}

impl TaskFilter {
    /// Parse the recognised filter keys.
    ///
    /// - `status`, `priority`: comma-separated string or array of strings
    /// - `owner_id`, `project_id`: UUID strings
    /// - `completed`: boolean or `"true"`/`"false"`/`"1"`/`"0"`
    /// - `due_from`, `due_to`: RFC 3339 timestamps or `YYYY-MM-DD` dates
    ///   (start and end of day respectively)
    /// - `search`: text contained in the title
    ///
    /// `null` means "not filtered". Malformed values are rejected.
    pub fn from_raw_map(input: &RawInput) -> TaskResult<Self> {
        let filter = Self {
            owner_id: field(input, "owner_id", parse_uuid)?,
            project_id: field(input, "project_id", parse_uuid)?,
            statuses: field(input, "status", parse_list)?,
            priorities: field(input, "priority", parse_list)?,
            completed: field(input, "completed", parse_bool)?,
            due_from: field(input, "due_from", |key, v| parse_datetime(key, v, false))?,
            due_to: field(input, "due_to", |key, v| parse_datetime(key, v, true))?,
            search: field(input, "search", parse_text)?,
        };

        filter.validate()?;
        Ok(filter)
    }

    /// Check that every populated field forms a valid criterion
    pub fn validate(&self) -> TaskResult<()> {
        if let Some(statuses) = &self.statuses {
            StatusIn::new(statuses.iter().copied())?;
        }
        if let Some(priorities) = &self.priorities {
            PriorityIn::new(priorities.iter().copied())?;
        }
        if self.due_from.is_some() || self.due_to.is_some() {
            DueBetween::new(self.due_from, self.due_to)?;
        }
        if let Some(search) = &self.search {
            TitleContains::new(search.as_str())?;
        }
        Ok(())
    }

    /// Criteria for this filter, in a fixed order: owner, project, status,
    /// priority, completion, due window, search.
    pub fn criteria<Q: QueryHandle>(&self) -> TaskResult<CriteriaSet<Q>> {
        let mut criteria = CriteriaSet::empty();

        if let Some(owner_id) = self.owner_id {
            criteria = criteria.with(OwnerIs(owner_id));
        }
        if let Some(project_id) = self.project_id {
            criteria = criteria.with(ProjectIs(project_id));
        }
        if let Some(statuses) = &self.statuses {
            criteria = criteria.with(StatusIn::new(statuses.iter().copied())?);
        }
        if let Some(priorities) = &self.priorities {
            criteria = criteria.with(PriorityIn::new(priorities.iter().copied())?);
        }
        if let Some(completed) = self.completed {
            criteria = criteria.with(CompletionIs(completed));
        }
        if self.due_from.is_some() || self.due_to.is_some() {
            criteria = criteria.with(DueBetween::new(self.due_from, self.due_to)?);
        }
        if let Some(search) = &self.search {
            criteria = criteria.with(TitleContains::new(search.as_str())?);
        }

        Ok(criteria)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn invalid(key: &str, message: impl std::fmt::Display) -> TaskError {
    TaskError::InvalidFilter(format!("{key}: {message}"))
}

fn field<T>(
    input: &RawInput,
    key: &str,
    parse: impl Fn(&str, &Value) -> TaskResult<T>,
) -> TaskResult<Option<T>> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse(key, value).map(Some),
    }
}

fn as_str<'a>(key: &str, value: &'a Value) -> TaskResult<&'a str> {
    value
        .as_str()
        .map(str::trim)
        .ok_or_else(|| invalid(key, format!("expected a string, got {value}")))
}

fn parse_uuid(key: &str, value: &Value) -> TaskResult<Uuid> {
    let raw = as_str(key, value)?;
    Uuid::parse_str(raw).map_err(|e| invalid(key, e))
}

fn parse_list<T: FromStr>(key: &str, value: &Value) -> TaskResult<Vec<T>> {
    let items: Vec<&str> = match value {
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| as_str(key, item))
            .collect::<TaskResult<_>>()?,
        other => return Err(invalid(key, format!("expected a list, got {other}"))),
    };

    if items.is_empty() {
        return Err(invalid(key, "expected at least one value"));
    }

    items
        .into_iter()
        .map(|item| T::from_str(item).map_err(|_| invalid(key, format!("unknown value {item:?}"))))
        .collect()
}

fn parse_bool(key: &str, value: &Value) -> TaskResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(invalid(key, format!("expected a boolean, got {other:?}"))),
        },
        other => Err(invalid(key, format!("expected a boolean, got {other}"))),
    }
}

fn parse_datetime(key: &str, value: &Value, end_of_day: bool) -> TaskResult<DateTime<Utc>> {
    let raw = as_str(key, value)?;

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| invalid(key, format!("expected RFC 3339 or YYYY-MM-DD, got {raw:?}")))?;
    let time = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        date.and_hms_opt(0, 0, 0)
    };

    time.map(|naive| naive.and_utc())
        .ok_or_else(|| invalid(key, format!("invalid date {raw:?}")))
}

fn parse_text(key: &str, value: &Value) -> TaskResult<String> {
    Ok(as_str(key, value)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawInput {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_empty_input() {
        let filter = TaskFilter::from_raw_map(&RawInput::new()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_full_input() {
        let owner = Uuid::new_v4();
        let filter = TaskFilter::from_raw_map(&raw(json!({
            "owner_id": owner.to_string(),
            "status": "todo, in_progress",
            "priority": ["high", "urgent"],
            "completed": "false",
            "due_from": "2026-01-01",
            "due_to": "2026-01-31T12:00:00+02:00",
            "search": "  docs ",
            "page": 3,
        })))
        .unwrap();

        assert_eq!(filter.owner_id, Some(owner));
        assert_eq!(
            filter.statuses,
            Some(vec![TaskStatus::Todo, TaskStatus::InProgress])
        );
        assert_eq!(
            filter.priorities,
            Some(vec![TaskPriority::High, TaskPriority::Urgent])
        );
        assert_eq!(filter.completed, Some(false));
        assert_eq!(filter.due_from.unwrap().to_rfc3339(), "2026-01-01T00:00:00+00:00");
        assert_eq!(filter.due_to.unwrap().to_rfc3339(), "2026-01-31T10:00:00+00:00");
        assert_eq!(filter.search.as_deref(), Some("docs"));
    }

    #[test]
    fn test_date_only_upper_bound_covers_whole_day() {
        let filter = TaskFilter::from_raw_map(&raw(json!({ "due_to": "2026-03-05" }))).unwrap();
        let due_to = filter.due_to.unwrap();
        assert_eq!(due_to.date_naive().to_string(), "2026-03-05");
        assert_eq!(due_to.format("%H:%M:%S").to_string(), "23:59:59");
    }

    #[test]
    fn test_rejects_malformed_values() {
        for input in [
            json!({ "status": "" }),
            json!({ "status": [] }),
            json!({ "status": "archived" }),
            json!({ "status": 3 }),
            json!({ "owner_id": "not-a-uuid" }),
            json!({ "completed": "maybe" }),
            json!({ "due_from": "yesterday" }),
            json!({ "due_from": "2026-02-01", "due_to": "2026-01-01" }),
            json!({ "search": "   " }),
        ] {
            let result = TaskFilter::from_raw_map(&raw(input.clone()));
            assert!(
                matches!(
                    result,
                    Err(TaskError::InvalidFilter(_))
                        | Err(TaskError::Query(query_filter::QueryError::InvalidCriterion(_)))
                ),
                "{input} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_null_means_unfiltered() {
        let filter = TaskFilter::from_raw_map(&raw(json!({ "status": null, "search": null }))).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_criteria_order() {
        let filter = TaskFilter {
            search: Some("docs".to_string()),
            owner_id: Some(Uuid::nil()),
            completed: Some(true),
            ..Default::default()
        };
        let criteria = filter
            .criteria::<query_filter::InMemoryQuery<crate::Task>>()
            .unwrap();
        let names: Vec<String> = criteria.iter().map(|c| format!("{c:?}")).collect();

        assert_eq!(names.len(), 3);
        assert!(names[0].starts_with("OwnerIs"));
        assert!(names[1].starts_with("CompletionIs"));
        assert!(names[2].starts_with("TitleContains"));
    }
}
