use sqlx::SqlitePool;

use crate::errors::AppError;
use crate::models::{EqualWeightResponse, MedianValuationPoint, ValuationPercentiles};
use crate::services::{quote_service, statistics};

pub async fn valuation_percentiles(
    pool: &SqlitePool,
    code: &str,
    limit: i64,
) -> Result<ValuationPercentiles, AppError> {
    let history = quote_service::history(pool, code, limit).await?;
    Ok(ValuationPercentiles {
        code: code.to_string(),
        points: history.len(),
        pe: statistics::latest_percentile(&history, |q| q.pe_ttm),
        pb: statistics::latest_percentile(&history, |q| q.pb_mrq),
    })
}

pub async fn equal_weight(
    pool: &SqlitePool,
    codes: &[String],
    start: &str,
    end: &str,
) -> Result<EqualWeightResponse, AppError> {
    let series = quote_service::batch_range(pool, codes, start, end).await?;
    let net = statistics::equal_weight_net_value(&series);
    let stats = statistics::net_value_stats(&net);
    Ok(EqualWeightResponse { series: net, stats })
}

pub async fn median_valuation(
    pool: &SqlitePool,
    codes: &[String],
    start: &str,
    end: &str,
) -> Result<Vec<MedianValuationPoint>, AppError> {
    let series = quote_service::batch_range(pool, codes, start, end).await?;
    Ok(statistics::median_valuation_series(&series))
}
