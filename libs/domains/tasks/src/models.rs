use chrono::{DateTime, Utc};
use query_filter::{FieldValue, Filterable};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Task priority levels
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_priority")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    #[sea_orm(string_value = "low")]
    Low,
    /// Default priority
    #[default]
    #[sea_orm(string_value = "medium")]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

/// Task status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    /// Task not started
    #[default]
    #[sea_orm(string_value = "todo")]
    Todo,
    /// Task in progress
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    /// Task completed
    #[sea_orm(string_value = "done")]
    Done,
}

/// Task entity - represents a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Task description
    pub description: String,
    /// Whether the task is completed
    pub completed: bool,
    /// Optional project association
    pub project_id: Option<Uuid>,
    /// User who owns the task
    pub owner_id: Uuid,
    /// Task priority
    pub priority: TaskPriority,
    /// Task status
    pub status: TaskStatus,
    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh `todo` task owned by `owner_id`
    pub fn new(title: impl Into<String>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            description: String::new(),
            completed: false,
            project_id: None,
            owner_id,
            priority: TaskPriority::default(),
            status: TaskStatus::default(),
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Filterable for Task {
    fn filterable_fields() -> &'static [&'static str] {
        &[
            "id",
            "title",
            "description",
            "completed",
            "project_id",
            "owner_id",
            "priority",
            "status",
            "due_date",
            "created_at",
            "updated_at",
        ]
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        let value: FieldValue = match field {
            "id" => self.id.into(),
            "title" => self.title.clone().into(),
            "description" => self.description.clone().into(),
            "completed" => self.completed.into(),
            "project_id" => self.project_id.into(),
            "owner_id" => self.owner_id.into(),
            "priority" => self.priority.to_string().into(),
            "status" => self.status.to_string().into(),
            "due_date" => self.due_date.into(),
            "created_at" => self.created_at.into(),
            "updated_at" => self.updated_at.into(),
            _ => return None,
        };
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_string_forms() {
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
        assert_eq!(TaskStatus::from_str("done").unwrap(), TaskStatus::Done);
        assert!(TaskStatus::from_str("finished").is_err());
    }

    #[test]
    fn test_field_values() {
        let owner = Uuid::new_v4();
        let task = Task::new("write docs", owner);

        assert_eq!(task.field_value("owner_id"), Some(FieldValue::Uuid(owner)));
        assert_eq!(task.field_value("status"), Some(FieldValue::from("todo")));
        assert_eq!(task.field_value("priority"), Some(FieldValue::from("medium")));
        assert_eq!(task.field_value("due_date"), Some(FieldValue::Null));
        assert_eq!(task.field_value("secret"), None);

        for field in Task::filterable_fields() {
            assert!(task.field_value(field).is_some(), "{field} should resolve");
        }
    }
}
