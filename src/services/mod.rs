//! Business rules for each resource. Handlers stay thin and call into these
//! functions with the shared database connection.

pub mod bookings;
pub mod credentials;
pub mod destinations;
pub mod roles;
pub mod users;

use sea_orm::sea_query::LikeExpr;
use serde::Serialize;

use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// 1-based page request for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl PageParams {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> AppResult<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        // The paginator computes the row offset as index * limit; SQL offsets are signed
        let offset = (page - 1).checked_mul(limit);
        if !offset.is_some_and(|offset| offset <= i64::MAX as u64) {
            return Err(AppError::BadRequest("page is out of range".to_string()));
        }

        Ok(Self { page, limit })
    }

    /// Zero-based page index as expected by sea-orm's paginator
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, params: PageParams) -> Self {
        Self {
            data,
            meta: PageMeta {
                total,
                page: params.page,
                limit: params.limit,
            },
        }
    }
}

/// Trim and check a required text field against its column width.
pub(crate) fn require_text(field: &str, value: &str, max_len: usize) -> AppResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(AppError::BadRequest(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }

    Ok(value.to_string())
}

pub(crate) fn require_email(field: &str, value: &str) -> AppResult<String> {
    let value = require_text(field, value, 255)?;

    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(value),
        _ => Err(AppError::BadRequest(format!("{} must be a valid email", field))),
    }
}

/// Case-folded substring pattern with `%`, `_` and `\` matched literally.
pub(crate) fn contains_pattern(needle: &str) -> LikeExpr {
    let mut pattern = String::from("%");
    for ch in needle.trim().to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');

    LikeExpr::new(pattern).escape('\\')
}
