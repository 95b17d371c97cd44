//! Composable query filtering and pagination
//!
//! This library provides the pieces every list/search endpoint needs:
//! validated pagination parameters, reusable filter criteria, ordered
//! composition of criteria, and an engine that runs them against an
//! abstract query handle supplied by the persistence layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ QueryFilterEngine│  ← criteria → count → limit/offset → execute
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │   CriteriaSet    │  ← ordered, left-to-right fold of Criterion::apply
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │   QueryHandle    │  ← collaborator-owned (InMemoryQuery, SeaOrmQuery, ...)
//! └──────────────────┘
//! ```
//!
//! # Features
//!
//! - `postgres` (default) - [`SeaOrmQuery`] backed by SeaORM
//! - `config` - `core_config::FromEnv` for [`EngineConfig`]
//!
//! # Usage
//!
//! ```ignore
//! use query_filter::{
//!     CriteriaSet, FieldCriterion, FilterOperator, InMemoryQuery, PaginationSpec,
//!     QueryFilterEngine,
//! };
//!
//! let criteria = CriteriaSet::empty().add(FieldCriterion::new(
//!     "status",
//!     FilterOperator::Eq,
//!     "done",
//! )?);
//! let pagination = PaginationSpec::create(Some(2), Some(10))?;
//!
//! let engine = QueryFilterEngine::default();
//! let page = engine
//!     .fetch_page(InMemoryQuery::new(rows), &criteria, &pagination)
//!     .await?;
//! assert!(page.records.len() <= 10);
//! ```

pub mod criteria;
pub mod engine;
pub mod error;
pub mod memory;
pub mod pagination;
pub mod query;

#[cfg(feature = "postgres")]
pub mod postgres;

// Re-export commonly used types
pub use criteria::{CriteriaSet, Criterion, FieldCriterion, RangeCriterion};
pub use engine::{EngineConfig, PageResult, QueryFilterEngine};
pub use error::{QueryError, QueryResult};
pub use memory::{Filterable, InMemoryQuery};
pub use pagination::{PaginationChanges, PaginationSpec, RawInput};
pub use query::{FieldValue, FilterOperator, QueryHandle};

#[cfg(feature = "postgres")]
pub use postgres::SeaOrmQuery;
