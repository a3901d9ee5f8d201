pub mod client;
mod error;
mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::inference::StrokeModel;

pub use client::{check_health, HealthCheckError};
pub use error::ApiError;
pub use middleware::{RateLimiter, SecurityConfig};

/// Shared handler state. The model is read-only, so requests never contend.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn StrokeModel>,
}

/// Build the service: public `/` and `/health`, guarded `/predict` and `/model`.
pub fn create_router(model: Arc<dyn StrokeModel>, security: SecurityConfig) -> Router {
    let mut scoring = Router::new().route("/predict", post(handlers::predict));
    if security.rate_limiter.is_some() {
        scoring = scoring.route_layer(from_fn_with_state(
            security.clone(),
            middleware::rate_limit_middleware,
        ));
    }

    let protected = scoring
        .route("/model", get(handlers::model_info))
        .route_layer(from_fn_with_state(
            security.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security.cors_layer()),
        )
        .with_state(AppState { model })
}
