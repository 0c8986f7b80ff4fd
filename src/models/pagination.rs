use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cuts the `page`-th window (1-based) out of an already ordered list.
    /// `page` and `page_size` must both be at least 1.
    pub fn slice(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let total = items.len();
        let total_pages = total.div_ceil(page_size);
        let start = (page - 1).saturating_mul(page_size).min(total);
        let end = start.saturating_add(page_size).min(total);
        let data = items.into_iter().skip(start).take(end - start).collect();
        Self {
            data,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}

/// Raw `page`/`pageSize` query values. Kept as text so malformed numbers
/// surface as validation errors instead of extractor rejections.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    /// `(page, page_size)`, defaulting to page 1 and `default_page_size`.
    pub fn resolve(&self, default_page_size: usize) -> Result<(usize, usize), AppError> {
        let page = parse_param("page", self.page.as_deref(), 1)?;
        let page_size = parse_param("pageSize", self.page_size.as_deref(), default_page_size)?;
        Ok((page, page_size))
    }
}

/// Parses an optional query value; absent or blank gives `default`.
pub fn parse_param<T: FromStr>(name: &str, raw: Option<&str>, default: T) -> Result<T, AppError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| AppError::Validation(format!("Invalid {} '{}'", name, v))),
    }
}
