use axum::extract::{Path, Query, State};
use axum::{Json, Router};
use axum::routing::{get, post};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::{parse_param, CodesRangeRequest, EqualWeightResponse, MedianValuationPoint, ValuationPercentiles};
use crate::services;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/equal-weight", post(equal_weight))
        .route("/median-valuation", post(median_valuation))
        .route("/:code/percentile", get(valuation_percentiles))
}

#[derive(Debug, Deserialize)]
struct PercentileQuery {
    limit: Option<String>,
}

async fn valuation_percentiles(
    Path(code): Path<String>,
    Query(params): Query<PercentileQuery>,
    State(state): State<AppState>,
) -> Result<Json<ValuationPercentiles>, AppError> {
    let limit = parse_param("limit", params.limit.as_deref(), 0)?;
    info!("GET /analytics/{}/percentile - limit={}", code, limit);
    services::analytics_service::valuation_percentiles(&state.pool, &code, limit)
        .await
        .map(Json)
}

async fn equal_weight(
    State(state): State<AppState>,
    Json(body): Json<CodesRangeRequest>,
) -> Result<Json<EqualWeightResponse>, AppError> {
    info!("POST /analytics/equal-weight - {} codes {}..{}", body.codes.len(), body.start, body.end);
    services::analytics_service::equal_weight(&state.pool, &body.codes, &body.start, &body.end)
        .await
        .map(Json)
}

async fn median_valuation(
    State(state): State<AppState>,
    Json(body): Json<CodesRangeRequest>,
) -> Result<Json<Vec<MedianValuationPoint>>, AppError> {
    info!("POST /analytics/median-valuation - {} codes {}..{}", body.codes.len(), body.start, body.end);
    services::analytics_service::median_valuation(&state.pool, &body.codes, &body.start, &body.end)
        .await
        .map(Json)
}
