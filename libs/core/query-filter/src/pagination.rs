use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::{QueryError, QueryResult};

/// Untyped key/value input from the request boundary
pub type RawInput = Map<String, Value>;

pub const PAGE_KEY: &str = "page";
pub const PER_PAGE_KEY: &str = "per_page";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 15;

/// Validated page/per_page pair
///
/// Both values are always at least 1. Instances are immutable;
/// [`with_changes`](PaginationSpec::with_changes) returns a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PaginationParams")]
pub struct PaginationSpec {
    page: u64,
    per_page: u64,
}

/// Unvalidated pagination parameters as they arrive from a caller
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    #[serde(default = "default_page")]
    pub page: i64,
    #[validate(range(min = 1, message = "per_page must be at least 1"))]
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

/// Partial overrides for [`PaginationSpec::with_changes`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationChanges {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl TryFrom<PaginationParams> for PaginationSpec {
    type Error = QueryError;

    fn try_from(params: PaginationParams) -> QueryResult<Self> {
        params
            .validate()
            .map_err(|e| QueryError::Validation(e.to_string()))?;

        Ok(Self {
            page: params.page as u64,
            per_page: params.per_page as u64,
        })
    }
}

impl PaginationSpec {
    /// Build from optional values, defaulting to page 1 with 15 per page
    pub fn create(page: Option<i64>, per_page: Option<i64>) -> QueryResult<Self> {
        PaginationParams {
            page: page.unwrap_or(DEFAULT_PAGE),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE),
        }
        .try_into()
    }

    /// Read `page` and `per_page` from raw request input.
    ///
    /// Values may be JSON integers or numeric strings; `null` and empty
    /// strings count as absent.
    pub fn from_raw_map(input: &RawInput) -> QueryResult<Self> {
        let page = read_int(input, PAGE_KEY)?;
        let per_page = read_int(input, PER_PAGE_KEY)?;
        Self::create(page, per_page)
    }

    /// Serialize back using the external key names
    pub fn to_raw_map(&self) -> RawInput {
        let mut map = Map::new();
        map.insert(PAGE_KEY.to_string(), Value::from(self.page));
        map.insert(PER_PAGE_KEY.to_string(), Value::from(self.per_page));
        map
    }

    /// New instance with the given fields replaced, validated like `create`
    pub fn with_changes(&self, changes: PaginationChanges) -> QueryResult<Self> {
        Self::create(
            Some(changes.page.unwrap_or(self.page as i64)),
            Some(changes.per_page.unwrap_or(self.per_page as i64)),
        )
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Maximum number of rows on one page
    pub fn limit(&self) -> u64 {
        self.per_page
    }

    /// Rows to skip before this page starts
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for PaginationSpec {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE as u64,
            per_page: DEFAULT_PER_PAGE as u64,
        }
    }
}

fn read_int(input: &RawInput, key: &str) -> QueryResult<Option<i64>> {
    match input.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| QueryError::Validation(format!("{key} must be an integer, got {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| QueryError::Validation(format!("{key} must be an integer, got {s:?}"))),
        Some(other) => Err(QueryError::Validation(format!(
            "{key} must be an integer, got {other}"
        ))),
    }
}
