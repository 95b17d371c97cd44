use std::sync::Arc;

use async_trait::async_trait;
use query_filter::{InMemoryQuery, PageResult, PaginationSpec, QueryFilterEngine};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::TaskResult;
use crate::filter::TaskFilter;
use crate::models::Task;

/// Repository trait for Task reads
///
/// Implementations turn a [`TaskFilter`] into criteria for their own query
/// handle and page through results with a [`QueryFilterEngine`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Get a task by ID
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>>;

    /// One page of tasks matching `filter`, newest first
    async fn list(&self, filter: TaskFilter, pagination: PaginationSpec)
    -> TaskResult<PageResult<Task>>;

    /// Count tasks matching `filter`
    async fn count(&self, filter: TaskFilter) -> TaskResult<u64>;
}

/// In-memory implementation of TaskRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<Vec<Task>>>,
    engine: QueryFilterEngine,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: QueryFilterEngine) -> Self {
        Self {
            tasks: Arc::default(),
            engine,
        }
    }

    pub async fn insert(&self, task: Task) {
        tracing::debug!(task_id = %task.id, "Stored task");
        self.tasks.write().await.push(task);
    }

    /// Query over a newest-first copy of the current tasks
    async fn snapshot(&self) -> InMemoryQuery<Task> {
        let mut tasks = self.tasks.read().await.clone();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        InMemoryQuery::new(tasks)
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list(
        &self,
        filter: TaskFilter,
        pagination: PaginationSpec,
    ) -> TaskResult<PageResult<Task>> {
        let criteria = filter.criteria()?;
        let base = self.snapshot().await;

        Ok(self.engine.fetch_page(base, &criteria, &pagination).await?)
    }

    async fn count(&self, filter: TaskFilter) -> TaskResult<u64> {
        let criteria = filter.criteria()?;
        let base = self.snapshot().await;

        Ok(self.engine.count(base, &criteria).await?)
    }
}
