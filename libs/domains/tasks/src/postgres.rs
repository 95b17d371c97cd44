use std::sync::Arc;

use async_trait::async_trait;
use query_filter::{PageResult, PaginationSpec, QueryFilterEngine, SeaOrmQuery};
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use uuid::Uuid;

use crate::{
    entity,
    error::TaskResult,
    filter::TaskFilter,
    models::Task,
    repository::TaskRepository,
};

pub type TaskQuery = SeaOrmQuery<entity::Entity>;

pub struct PgTaskRepository {
    db: Arc<DatabaseConnection>,
    engine: QueryFilterEngine,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_engine(db, QueryFilterEngine::default())
    }

    pub fn with_engine(db: DatabaseConnection, engine: QueryFilterEngine) -> Self {
        Self {
            db: Arc::new(db),
            engine,
        }
    }

    /// All tasks, newest first, before any filter is applied
    pub fn base_query(&self) -> TaskQuery {
        SeaOrmQuery::from_select(
            entity::Entity::find().order_by_desc(entity::Column::CreatedAt),
            Arc::clone(&self.db),
        )
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let model = entity::Entity::find_by_id(id).one(self.db.as_ref()).await?;

        Ok(model.map(Into::into))
    }

    async fn list(
        &self,
        filter: TaskFilter,
        pagination: PaginationSpec,
    ) -> TaskResult<PageResult<Task>> {
        let criteria = filter.criteria::<TaskQuery>()?;

        let page = self
            .engine
            .fetch_page(self.base_query(), &criteria, &pagination)
            .await?;

        tracing::debug!(returned = page.records.len(), "Listed tasks");
        Ok(page.map(Task::from))
    }

    async fn count(&self, filter: TaskFilter) -> TaskResult<u64> {
        let criteria = filter.criteria::<TaskQuery>()?;
        let base = SeaOrmQuery::new(Arc::clone(&self.db));

        Ok(self.engine.count(base, &criteria).await?)
    }
}
