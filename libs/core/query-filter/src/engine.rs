use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::criteria::CriteriaSet;
use crate::error::QueryResult;
use crate::pagination::PaginationSpec;
use crate::query::QueryHandle;

#[cfg(feature = "config")]
use core_config::{env_parse, ConfigError, FromEnv};

/// Engine settings, passed in at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Run a count query before paginating so pages carry `total`
    pub count_total: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { count_total: true }
    }
}

#[cfg(feature = "config")]
impl FromEnv for EngineConfig {
    /// Reads `QUERY_COUNT_TOTAL` (default: true)
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            count_total: env_parse("QUERY_COUNT_TOTAL", true)?,
        })
    }
}

/// One page of records plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub records: Vec<T>,
    /// Total matches across all pages, when counting is enabled
    pub total: Option<u64>,
    pub page: u64,
    pub per_page: u64,
}

impl<T> PageResult<T> {
    /// Convert every record, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            records: self.records.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of pages needed for `total`; `None` when the total is unknown
    pub fn total_pages(&self) -> Option<u64> {
        match (self.total, self.per_page) {
            (Some(total), per_page) if per_page > 0 => Some(total.div_ceil(per_page)),
            _ => None,
        }
    }

    /// Whether a later page holds more records.
    ///
    /// Without a total, a full page is taken as a hint that more exist.
    pub fn has_next(&self) -> bool {
        match self.total_pages() {
            Some(pages) => self.page < pages,
            None => self.records.len() as u64 == self.per_page,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Runs criteria and pagination against a query handle
#[derive(Debug, Clone, Default)]
pub struct QueryFilterEngine {
    config: EngineConfig,
}

impl QueryFilterEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Filter `base`, then fetch the requested page.
    ///
    /// The total (when enabled) is counted on the filtered query before
    /// limit/offset narrow it. Requesting a page past the end returns no
    /// records but still reports the real total. Errors from criteria or
    /// the collaborator are returned as-is.
    #[instrument(
        skip_all,
        fields(
            page = pagination.page(),
            per_page = pagination.per_page(),
            criteria = criteria.len(),
        )
    )]
    pub async fn fetch_page<Q: QueryHandle>(
        &self,
        base: Q,
        criteria: &CriteriaSet<Q>,
        pagination: &PaginationSpec,
    ) -> QueryResult<PageResult<Q::Record>> {
        let filtered = criteria.apply_all(base)?;

        let total = if self.config.count_total {
            Some(filtered.count().await?)
        } else {
            None
        };

        let mut records = filtered
            .limit(pagination.limit())
            .offset(pagination.offset())
            .execute()
            .await?;
        records.truncate(usize::try_from(pagination.per_page()).unwrap_or(usize::MAX));

        debug!(returned = records.len(), total = ?total, "Fetched page");

        Ok(PageResult {
            records,
            total,
            page: pagination.page(),
            per_page: pagination.per_page(),
        })
    }

    /// Count matches for `criteria` without fetching any rows
    #[instrument(skip_all, fields(criteria = criteria.len()))]
    pub async fn count<Q: QueryHandle>(&self, base: Q, criteria: &CriteriaSet<Q>) -> QueryResult<u64> {
        criteria.apply_all(base)?.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(records: usize, total: Option<u64>, page: u64, per_page: u64) -> PageResult<usize> {
        PageResult {
            records: (0..records).collect(),
            total,
            page,
            per_page,
        }
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(page(10, Some(15), 1, 10).total_pages(), Some(2));
        assert_eq!(page(0, Some(0), 1, 10).total_pages(), Some(0));
        assert_eq!(page(5, Some(20), 1, 5).total_pages(), Some(4));
        assert_eq!(page(5, None, 1, 5).total_pages(), None);
    }

    #[test]
    fn test_has_next_and_prev() {
        assert!(page(10, Some(15), 1, 10).has_next());
        assert!(!page(5, Some(15), 2, 10).has_next());
        assert!(page(5, Some(15), 2, 10).has_prev());
        assert!(!page(10, Some(15), 1, 10).has_prev());

        // unknown total: a full page suggests more
        assert!(page(10, None, 1, 10).has_next());
        assert!(!page(3, None, 1, 10).has_next());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let mapped = page(2, Some(2), 1, 10).map(|n| n.to_string());
        assert_eq!(mapped.records, vec!["0", "1"]);
        assert_eq!(mapped.total, Some(2));
        assert_eq!((mapped.page, mapped.per_page), (1, 10));
    }

    #[test]
    fn test_default_config_counts() {
        assert!(QueryFilterEngine::default().config().count_total);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_from_env() {
        temp_env::with_var("QUERY_COUNT_TOTAL", Some("false"), || {
            let config = EngineConfig::from_env().unwrap();
            assert!(!config.count_total);
        });

        temp_env::with_var_unset("QUERY_COUNT_TOTAL", || {
            let config = EngineConfig::from_env().unwrap();
            assert!(config.count_total);
        });

        temp_env::with_var("QUERY_COUNT_TOTAL", Some("sometimes"), || {
            let err = EngineConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("QUERY_COUNT_TOTAL"));
        });
    }
}
