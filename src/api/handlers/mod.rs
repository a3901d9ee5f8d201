use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Html, IntoResponse},
    Json,
};

use super::error::ApiError;
use super::AppState;
use crate::models::*;

const INDEX_HTML: &str = include_str!("../index.html");

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Form page
// ============================================================

pub async fn index() -> Html<&'static str> {
    tracing::info!("Root endpoint accessed");
    Html(INDEX_HTML)
}

// ============================================================
// Prediction
// ============================================================

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<StrokeInput>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(input) = payload.map_err(|rejection| {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;
    tracing::info!(?input, "Received input");

    let record = input.validate().map_err(|e| {
        tracing::warn!("Validation error: {}", e);
        ApiError::Validation(e)
    })?;

    let prediction = state.model.predict(&record).map_err(|e| {
        tracing::error!("Prediction error: {}", e);
        ApiError::Prediction(e)
    })?;
    tracing::info!(
        prediction = prediction.label(),
        probability = prediction.probability,
        "Prediction complete"
    );

    Ok(Json(PredictionResponse::new(prediction, input)))
}

pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfo> {
    Json(state.model.info())
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
