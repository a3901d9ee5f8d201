//! Health check client used by the `status` command.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HealthCheckError {
    #[error("Server at {url} is not reachable: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Health endpoint returned invalid JSON: {0}")]
    InvalidBody(#[source] reqwest::Error),

    #[error("Server is unhealthy: {status} {body}")]
    Unhealthy {
        status: StatusCode,
        body: serde_json::Value,
    },
}

/// `GET {base_url}/health` and require a 2xx `{"status":"ok"}` reply.
pub async fn check_health(base_url: &str) -> Result<(), HealthCheckError> {
    let endpoint = format!("{}/health", base_url.trim_end_matches('/'));

    let response = reqwest::get(&endpoint)
        .await
        .map_err(|source| HealthCheckError::Unreachable {
            url: base_url.to_string(),
            source,
        })?;
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .map_err(HealthCheckError::InvalidBody)?;

    if status.is_success() && body["status"] == "ok" {
        Ok(())
    } else {
        Err(HealthCheckError::Unhealthy { status, body })
    }
}
