use std::collections::BTreeMap;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db;
use crate::errors::AppError;
use crate::models::{BonusRecord, DailyQuote, Page, StockCode};
use crate::services::valuation_ranking;

pub const DEFAULT_LIMIT: i64 = 100;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Checks a `YYYY-MM-DD` trading date and returns it in canonical form.
pub fn parse_date(raw: &str) -> Result<String, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

fn parse_range(start: &str, end: &str) -> Result<(String, String), AppError> {
    Ok((parse_date(start)?, parse_date(end)?))
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<DailyQuote>, AppError> {
    Ok(db::quote_queries::fetch_recent(pool, DEFAULT_LIMIT).await?)
}

pub async fn by_code(pool: &SqlitePool, code: &str) -> Result<Vec<DailyQuote>, AppError> {
    Ok(db::quote_queries::fetch_by_code(pool, code, DEFAULT_LIMIT).await?)
}

pub async fn by_code_and_range(
    pool: &SqlitePool,
    code: &str,
    start: &str,
    end: &str,
) -> Result<Vec<DailyQuote>, AppError> {
    let (start, end) = parse_range(start, end)?;
    Ok(db::quote_queries::fetch_range(pool, code, &start, &end).await?)
}

pub async fn distinct_codes(pool: &SqlitePool) -> Result<Vec<StockCode>, AppError> {
    Ok(db::quote_queries::fetch_codes(pool).await?)
}

pub async fn latest(pool: &SqlitePool, code: &str) -> Result<Option<DailyQuote>, AppError> {
    db::quote_queries::fetch_latest(pool, code)
        .await
        .map_err(|e| {
            error!("Failed to fetch latest quote for {}: {}", code, e);
            AppError::Db(e)
        })
}

/// Ascending series for charting. `limit <= 0` returns the whole history.
pub async fn history(pool: &SqlitePool, code: &str, limit: i64) -> Result<Vec<DailyQuote>, AppError> {
    let limit = (limit > 0).then_some(limit);
    Ok(db::quote_queries::fetch_history(pool, code, limit).await?)
}

/// All rows of one trading date ordered by composite PE/PB rank, paginated.
pub async fn ranked_by_date(
    pool: &SqlitePool,
    date: &str,
    page: usize,
    page_size: usize,
) -> Result<Page<DailyQuote>, AppError> {
    if page < 1 {
        return Err(AppError::Validation("page must be at least 1".into()));
    }
    if page_size < 1 {
        return Err(AppError::Validation("pageSize must be at least 1".into()));
    }
    let date = parse_date(date)?;
    let rows = db::quote_queries::fetch_by_date(pool, &date).await?;
    info!("Ranking {} quotes for {}", rows.len(), date);
    Ok(valuation_ranking::rank_page(rows, page, page_size))
}

pub async fn bonus(pool: &SqlitePool, code: &str) -> Result<Vec<BonusRecord>, AppError> {
    Ok(db::bonus_queries::fetch_by_code(pool, code).await?)
}

/// Range series for several codes, keyed by code. Every requested code is present.
pub async fn batch_range(
    pool: &SqlitePool,
    codes: &[String],
    start: &str,
    end: &str,
) -> Result<BTreeMap<String, Vec<DailyQuote>>, AppError> {
    let (start, end) = parse_range(start, end)?;
    let mut result = BTreeMap::new();
    for code in codes {
        let rows = db::quote_queries::fetch_range(pool, code, &start, &end).await?;
        result.insert(code.clone(), rows);
    }
    Ok(result)
}

pub async fn batch_date(
    pool: &SqlitePool,
    codes: &[String],
    date: &str,
) -> Result<BTreeMap<String, Option<DailyQuote>>, AppError> {
    let date = parse_date(date)?;
    let mut result = BTreeMap::new();
    for code in codes {
        let row = db::quote_queries::fetch_on_date(pool, code, &date).await?;
        result.insert(code.clone(), row);
    }
    Ok(result)
}
