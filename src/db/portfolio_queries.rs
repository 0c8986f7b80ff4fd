use sqlx::SqlitePool;
use crate::models::{Portfolio, PortfolioRow};

const PORTFOLIO_COLUMNS: &str =
    "id, name, stock_count, stocks, created_at, initial_value, current_value, created_time, updated_time";

pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<PortfolioRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {PORTFOLIO_COLUMNS}
         FROM portfolios
         ORDER BY created_time DESC, id DESC"
    );
    sqlx::query_as::<_, PortfolioRow>(&sql)
        .fetch_all(pool)
        .await
}

pub async fn fetch_one(pool: &SqlitePool, id: i64) -> Result<Option<PortfolioRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {PORTFOLIO_COLUMNS}
         FROM portfolios
         WHERE id = ?1"
    );
    sqlx::query_as::<_, PortfolioRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &SqlitePool, input: &Portfolio, stocks_json: &str)
-> Result<PortfolioRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO portfolios (name, stock_count, stocks, created_at, initial_value)
         VALUES (?1, ?2, ?3, ?4, ?5)
         RETURNING {PORTFOLIO_COLUMNS}"
    );
    sqlx::query_as::<_, PortfolioRow>(&sql)
        .bind(&input.name)
        .bind(input.stock_count)
        .bind(stocks_json)
        .bind(&input.created_at)
        .bind(input.initial_value)
        .fetch_one(pool)
        .await
}

/// Writes name, holdings, holding count and initial value in one statement so
/// the count can never drift from the stored list.
pub async fn update(pool: &SqlitePool, input: &Portfolio, stocks_json: &str)
-> Result<Option<PortfolioRow>, sqlx::Error> {
    let sql = format!(
        "UPDATE portfolios
         SET name = ?1, stock_count = ?2, stocks = ?3, initial_value = ?4,
             updated_time = datetime('now')
         WHERE id = ?5
         RETURNING {PORTFOLIO_COLUMNS}"
    );
    sqlx::query_as::<_, PortfolioRow>(&sql)
        .bind(&input.name)
        .bind(input.stock_count)
        .bind(stocks_json)
        .bind(input.initial_value)
        .bind(input.id)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &SqlitePool, id: i64)
-> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM portfolios WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
