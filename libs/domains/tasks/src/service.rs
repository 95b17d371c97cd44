use std::sync::Arc;

use query_filter::{PageResult, PaginationSpec, RawInput};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};
use crate::filter::TaskFilter;
use crate::models::Task;
use crate::repository::TaskRepository;

/// Service layer for Task queries
#[derive(Clone)]
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Get a task by ID
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: Uuid) -> TaskResult<Task> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// List tasks from raw request input.
    ///
    /// Pagination (`page`, `per_page`) and filters are both read from
    /// `input`; either failing stops the call before the repository is
    /// reached.
    #[instrument(skip(self, input))]
    pub async fn list_tasks(&self, input: &RawInput) -> TaskResult<PageResult<Task>> {
        let pagination = PaginationSpec::from_raw_map(input)?;
        let filter = TaskFilter::from_raw_map(input)?;

        self.repository.list(filter, pagination).await
    }

    /// List tasks owned by `owner_id`, ignoring any `owner_id` in `input`
    #[instrument(skip(self, input), fields(owner_id = %owner_id))]
    pub async fn list_owned_tasks(
        &self,
        owner_id: Uuid,
        input: &RawInput,
    ) -> TaskResult<PageResult<Task>> {
        let pagination = PaginationSpec::from_raw_map(input)?;
        let filter = TaskFilter {
            owner_id: Some(owner_id),
            ..TaskFilter::from_raw_map(input)?
        };

        self.repository.list(filter, pagination).await
    }

    /// Count tasks matching the filters in `input`
    #[instrument(skip(self, input))]
    pub async fn count_tasks(&self, input: &RawInput) -> TaskResult<u64> {
        let filter = TaskFilter::from_raw_map(input)?;
        self.repository.count(filter).await
    }
}
