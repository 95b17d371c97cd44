//! Tasks Domain
//!
//! Read-side of the tasks domain, built on `query_filter`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Service   │  ← raw input → PaginationSpec + TaskFilter
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← TaskFilter → CriteriaSet → QueryFilterEngine
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, enums, criteria
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{PgTaskRepository, TaskService};
//! use sea_orm::Database;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let service = TaskService::new(PgTaskRepository::new(db));
//!
//! let input = json!({ "page": 2, "per_page": 10, "status": "todo,in_progress" });
//! if let serde_json::Value::Object(input) = input {
//!     let page = service.list_tasks(&input).await?;
//!     println!("{} of {:?}", page.records.len(), page.total);
//! }
//! # Ok(())
//! # }
//! ```

pub mod criteria;
pub mod entity;
pub mod error;
pub mod filter;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use criteria::{
    CompletionIs, DueBetween, OwnerIs, PriorityIn, ProjectIs, StatusIn, TitleContains,
};
pub use error::{TaskError, TaskResult};
pub use filter::TaskFilter;
pub use models::{Task, TaskPriority, TaskStatus};
pub use postgres::{PgTaskRepository, TaskQuery};
pub use repository::{InMemoryTaskRepository, TaskRepository};
pub use service::TaskService;
