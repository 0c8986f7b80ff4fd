use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{
    parse_param, BonusRecord, CodesDateRequest, CodesRangeRequest, DailyQuote, Page, PageQuery,
    StockCode,
};
use crate::services::quote_service::{self, DEFAULT_PAGE_SIZE};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_quotes))
        .route("/codes", get(list_codes))
        .route("/date/:date", get(ranked_by_date))
        .route("/batch/range", post(batch_range))
        .route("/batch/date", post(batch_date))
        .route("/:code", get(quotes_by_code))
        .route("/:code/latest", get(latest_quote))
        .route("/:code/range", get(quotes_in_range))
        .route("/:code/history", get(quote_history))
        .route("/:code/bonus", get(bonus_records))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<String>,
}

fn log_failure<T>(what: &str, result: Result<T, AppError>) -> Result<T, AppError> {
    result.map_err(|e| {
        error!("Failed to {}: {}", what, e);
        e
    })
}

pub async fn list_quotes(State(state): State<AppState>) -> Result<Json<Vec<DailyQuote>>, AppError> {
    info!("GET /stocks - Fetching most recent quotes");
    let quotes = log_failure("fetch recent quotes", quote_service::list(&state.pool).await)?;
    Ok(Json(quotes))
}

pub async fn list_codes(State(state): State<AppState>) -> Result<Json<Vec<StockCode>>, AppError> {
    info!("GET /stocks/codes - Fetching stock codes");
    let codes = log_failure("fetch stock codes", quote_service::distinct_codes(&state.pool).await)?;
    Ok(Json(codes))
}

pub async fn quotes_by_code(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DailyQuote>>, AppError> {
    info!("GET /stocks/{} - Fetching quotes", code);
    let quotes = log_failure(
        &format!("fetch quotes for {}", code),
        quote_service::by_code(&state.pool, &code).await,
    )?;
    Ok(Json(quotes))
}

pub async fn latest_quote(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Option<DailyQuote>>, AppError> {
    info!("GET /stocks/{}/latest - Fetching latest quote", code);
    let quote = quote_service::latest(&state.pool, &code).await?;
    Ok(Json(quote))
}

pub async fn quotes_in_range(
    Path(code): Path<String>,
    Query(q): Query<RangeQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DailyQuote>>, AppError> {
    info!("GET /stocks/{}/range - start={:?} end={:?}", code, q.start, q.end);
    let (Some(start), Some(end)) = (q.start, q.end) else {
        return Err(AppError::Validation("Both start and end are required".into()));
    };
    let quotes = log_failure(
        &format!("fetch range for {}", code),
        quote_service::by_code_and_range(&state.pool, &code, &start, &end).await,
    )?;
    Ok(Json(quotes))
}

pub async fn quote_history(
    Path(code): Path<String>,
    Query(q): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DailyQuote>>, AppError> {
    let limit = parse_param("limit", q.limit.as_deref(), 0)?;
    info!("GET /stocks/{}/history - limit={}", code, limit);
    let quotes = log_failure(
        &format!("fetch history for {}", code),
        quote_service::history(&state.pool, &code, limit).await,
    )?;
    Ok(Json(quotes))
}

pub async fn ranked_by_date(
    Path(date): Path<String>,
    Query(q): Query<PageQuery>,
    State(state): State<AppState>,
) -> Result<Json<Page<DailyQuote>>, AppError> {
    let (page, page_size) = q.resolve(DEFAULT_PAGE_SIZE)?;
    info!("GET /stocks/date/{} - page={} pageSize={}", date, page, page_size);
    let result = log_failure(
        &format!("rank quotes for {}", date),
        quote_service::ranked_by_date(&state.pool, &date, page, page_size).await,
    )?;
    Ok(Json(result))
}

pub async fn bonus_records(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<BonusRecord>>, AppError> {
    info!("GET /stocks/{}/bonus - Fetching bonus records", code);
    let records = log_failure(
        &format!("fetch bonus records for {}", code),
        quote_service::bonus(&state.pool, &code).await,
    )?;
    Ok(Json(records))
}

pub async fn batch_range(
    State(state): State<AppState>,
    Json(body): Json<CodesRangeRequest>,
) -> Result<Json<BTreeMap<String, Vec<DailyQuote>>>, AppError> {
    info!("POST /stocks/batch/range - {} codes", body.codes.len());
    let result = log_failure(
        "fetch batch range",
        quote_service::batch_range(&state.pool, &body.codes, &body.start, &body.end).await,
    )?;
    Ok(Json(result))
}

pub async fn batch_date(
    State(state): State<AppState>,
    Json(body): Json<CodesDateRequest>,
) -> Result<Json<BTreeMap<String, Option<DailyQuote>>>, AppError> {
    info!("POST /stocks/batch/date - {} codes on {}", body.codes.len(), body.date);
    let result = log_failure(
        "fetch batch date",
        quote_service::batch_date(&state.pool, &body.codes, &body.date).await,
    )?;
    Ok(Json(result))
}
