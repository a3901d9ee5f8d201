use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::json;
use stroke_predict::api::{check_health, create_router, HealthCheckError, SecurityConfig};
use stroke_predict::inference::TreeEnsemble;

const TINY_MODEL: &str = include_str!("fixtures/tiny_model.json");

/// Serve `app` on an ephemeral loopback port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind loopback listener");
    let addr: SocketAddr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn reports_a_running_server_as_healthy() {
    let model = TreeEnsemble::from_json(TINY_MODEL).expect("Failed to load model");
    let url = spawn(create_router(Arc::new(model), SecurityConfig::disabled())).await;

    check_health(&url).await.expect("Server should be healthy");
    check_health(&format!("{}/", url))
        .await
        .expect("Trailing slash should be tolerated");
}

#[tokio::test]
async fn reports_non_ok_status_as_unhealthy() {
    let app = Router::new().route(
        "/health",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "starting" })),
            )
        }),
    );
    let url = spawn(app).await;

    let err = check_health(&url).await.unwrap_err();

    match err {
        HealthCheckError::Unhealthy { status, body } => {
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(body["status"], "starting");
        }
        other => panic!("expected Unhealthy, got {:?}", other),
    }
}

#[tokio::test]
async fn reports_wrong_status_field_as_unhealthy() {
    let app = Router::new().route("/health", get(|| async { Json(json!({ "status": "down" })) }));
    let url = spawn(app).await;

    let err = check_health(&url).await.unwrap_err();

    assert!(matches!(err, HealthCheckError::Unhealthy { .. }));
}

#[tokio::test]
async fn reports_non_json_body_as_invalid() {
    let app = Router::new().route("/health", get(|| async { "ok" }));
    let url = spawn(app).await;

    let err = check_health(&url).await.unwrap_err();

    assert!(matches!(err, HealthCheckError::InvalidBody(_)));
}

#[tokio::test]
async fn reports_closed_port_as_unreachable() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind loopback listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);

    let err = check_health(&format!("http://{}", addr)).await.unwrap_err();

    assert!(matches!(err, HealthCheckError::Unreachable { .. }));
    assert!(err.to_string().contains(&addr.to_string()));
}
