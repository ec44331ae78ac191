/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Registration, login, token refresh and profiles
/// - `todos`: The caller's own todos
/// - `admin`: Cross-user views for administrators

pub mod admin;
pub mod health;
pub mod todos;
pub mod users;

use axum::extract::{rejection::PathRejection, Path, Query};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 500;

/// `?limit=&offset=` query parameters for list endpoints
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct Pagination {
    /// Page size (default 100, at most 500)
    pub limit: Option<i64>,

    /// Rows to skip
    pub offset: Option<i64>,
}

impl Pagination {
    /// Clamped `(limit, offset)`
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// Pagination extracted leniently; malformed values fall back to defaults
pub(crate) fn pagination(query: Option<Query<Pagination>>) -> Pagination {
    query.map(|Query(p)| p).unwrap_or_default()
}

/// Resolves an `:id` path segment
///
/// An id that is not a UUID cannot name an existing row, so it is reported
/// with the same 404 message as a missing one.
pub(crate) fn path_id(path: Result<Path<Uuid>, PathRejection>, not_found: &str) -> ApiResult<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::NotFound(not_found.to_string()))
}

/// Trims a required string field, treating blank as missing
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_bounds() {
        assert_eq!(Pagination::default().bounds(), (100, 0));

        let p = Pagination {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(p.bounds(), (500, 0));

        let p = Pagination {
            limit: Some(0),
            offset: Some(20),
        };
        assert_eq!(p.bounds(), (1, 20));
    }

    #[test]
    fn test_required() {
        assert_eq!(required(Some("  Buy milk ".to_string())), Some("Buy milk".to_string()));
        assert_eq!(required(Some("   ".to_string())), None);
        assert_eq!(required(None), None);
    }
}
