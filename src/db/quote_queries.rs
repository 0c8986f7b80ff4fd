use sqlx::SqlitePool;
use crate::models::{DailyQuote, StockCode};

const QUOTE_COLUMNS: &str = "code, date, codeName, open, high, low, close, preclose, volume, amount, \
    adjustflag, turn, tradestatus, pctChg, peTTM, pbMRQ, psTTM, pcfNcfTTM, isST";

pub async fn fetch_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<DailyQuote>, sqlx::Error> {
    let sql = format!(
        "SELECT {QUOTE_COLUMNS} FROM stock_day_pepb_data ORDER BY date DESC LIMIT ?1"
    );
    sqlx::query_as::<_, DailyQuote>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn fetch_by_code(
    pool: &SqlitePool,
    code: &str,
    limit: i64,
) -> Result<Vec<DailyQuote>, sqlx::Error> {
    let sql = format!(
        "SELECT {QUOTE_COLUMNS} FROM stock_day_pepb_data
         WHERE code = ?1
         ORDER BY date DESC
         LIMIT ?2"
    );
    sqlx::query_as::<_, DailyQuote>(&sql)
        .bind(code)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Inclusive date range for one code, oldest first.
pub async fn fetch_range(
    pool: &SqlitePool,
    code: &str,
    start: &str,
    end: &str,
) -> Result<Vec<DailyQuote>, sqlx::Error> {
    let sql = format!(
        "SELECT {QUOTE_COLUMNS} FROM stock_day_pepb_data
         WHERE code = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC"
    );
    sqlx::query_as::<_, DailyQuote>(&sql)
        .bind(code)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
}

/// One entry per code that has a name, using the name from its most recent named row.
pub async fn fetch_codes(pool: &SqlitePool) -> Result<Vec<StockCode>, sqlx::Error> {
    sqlx::query_as::<_, StockCode>(
        r#"
        SELECT t.code AS code, t.codeName AS codeName
        FROM stock_day_pepb_data t
        WHERE t.codeName IS NOT NULL
          AND t.date = (
              SELECT MAX(s.date) FROM stock_day_pepb_data s
              WHERE s.code = t.code AND s.codeName IS NOT NULL
          )
        ORDER BY t.code ASC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn fetch_latest(
    pool: &SqlitePool,
    code: &str,
) -> Result<Option<DailyQuote>, sqlx::Error> {
    let sql = format!(
        "SELECT {QUOTE_COLUMNS} FROM stock_day_pepb_data
         WHERE code = ?1
         ORDER BY date DESC
         LIMIT 1"
    );
    sqlx::query_as::<_, DailyQuote>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await
}

/// Closing price of the most recent row for `code`. `None` when there is no
/// row or the latest row has no close.
pub async fn fetch_latest_close(
    pool: &SqlitePool,
    code: &str,
) -> Result<Option<f64>, sqlx::Error> {
    let close: Option<Option<f64>> = sqlx::query_scalar(
        "SELECT close FROM stock_day_pepb_data
         WHERE code = ?1
         ORDER BY date DESC
         LIMIT 1",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;
    Ok(close.flatten())
}

/// Series for charting, oldest first. With `limit` only the most recent
/// `limit` rows are returned.
pub async fn fetch_history(
    pool: &SqlitePool,
    code: &str,
    limit: Option<i64>,
) -> Result<Vec<DailyQuote>, sqlx::Error> {
    match limit {
        Some(n) => {
            let sql = format!(
                "SELECT {QUOTE_COLUMNS} FROM stock_day_pepb_data
                 WHERE code = ?1
                 ORDER BY date DESC
                 LIMIT ?2"
            );
            let mut rows = sqlx::query_as::<_, DailyQuote>(&sql)
                .bind(code)
                .bind(n)
                .fetch_all(pool)
                .await?;
            rows.reverse();
            Ok(rows)
        }
        None => {
            let sql = format!(
                "SELECT {QUOTE_COLUMNS} FROM stock_day_pepb_data
                 WHERE code = ?1
                 ORDER BY date ASC"
            );
            sqlx::query_as::<_, DailyQuote>(&sql)
                .bind(code)
                .fetch_all(pool)
                .await
        }
    }
}

/// Every row for one trading date, ordered by code.
pub async fn fetch_by_date(pool: &SqlitePool, date: &str) -> Result<Vec<DailyQuote>, sqlx::Error> {
    let sql = format!(
        "SELECT {QUOTE_COLUMNS} FROM stock_day_pepb_data
         WHERE date = ?1
         ORDER BY code ASC"
    );
    sqlx::query_as::<_, DailyQuote>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await
}

pub async fn fetch_on_date(
    pool: &SqlitePool,
    code: &str,
    date: &str,
) -> Result<Option<DailyQuote>, sqlx::Error> {
    let sql = format!(
        "SELECT {QUOTE_COLUMNS} FROM stock_day_pepb_data
         WHERE code = ?1 AND date = ?2"
    );
    sqlx::query_as::<_, DailyQuote>(&sql)
        .bind(code)
        .bind(date)
        .fetch_optional(pool)
        .await
}

/// Writes quote rows, replacing any existing row with the same (code, date).
/// Used to seed local databases and tests; the service itself never writes quotes.
pub async fn insert_many(pool: &SqlitePool, items: &[DailyQuote]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for q in items {
        sqlx::query(
            "INSERT OR REPLACE INTO stock_day_pepb_data
             (code, date, codeName, open, high, low, close, preclose, volume, amount,
              adjustflag, turn, tradestatus, pctChg, peTTM, pbMRQ, psTTM, pcfNcfTTM, isST)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        )
        .bind(&q.code)
        .bind(&q.date)
        .bind(&q.code_name)
        .bind(q.open)
        .bind(q.high)
        .bind(q.low)
        .bind(q.close)
        .bind(q.preclose)
        .bind(q.volume)
        .bind(q.amount)
        .bind(q.adjustflag)
        .bind(q.turn)
        .bind(q.tradestatus)
        .bind(q.pct_chg)
        .bind(q.pe_ttm)
        .bind(q.pb_mrq)
        .bind(q.ps_ttm)
        .bind(q.pcf_ncf_ttm)
        .bind(q.is_st)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
