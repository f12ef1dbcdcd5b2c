//! Shared pagination types for list queries.

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Generic pagination parameters. Values are clamped when read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Effective limit: defaults to 10, capped at 100, floor of 1.
    pub fn clamped_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Effective offset: defaults to 0, never negative.
    pub fn clamped_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// A page of results with the unpaginated total.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
