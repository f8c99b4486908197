//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use prediction_core::{PredictionResult, RawRecord};

use crate::{AppResult, AppState};
use crate::models::{BatchPredictRequest, BatchPredictResponse};

/// Predict a single record
pub async fn single(
    State(state): State<AppState>,
    payload: Result<Json<RawRecord>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    let Json(record) = payload?;

    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || service.predict(&record)).await??;

    tracing::info!(
        request_id = result.request_id,
        class = result.numeric_class,
        "Prediction served"
    );

    Ok(Json(result))
}

/// Predict a batch of records, one label per record in input order
pub async fn batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchPredictRequest>, JsonRejection>,
) -> AppResult<Json<BatchPredictResponse>> {
    let Json(req) = payload?;
    let count = req.data.len();

    let service = state.service.clone();
    let predictions = tokio::task::spawn_blocking(move || service.predict_batch(&req.data)).await??;

    tracing::info!("Batch of {} records scored", count);

    Ok(Json(BatchPredictResponse { predictions }))
}
