//! Health check

use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

/// Health of the service
#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    timestamp: DateTime<Utc>,
    service: &'static str,
}

/// Health check, does not touch the storage
///
/// Request:
/// ```sh
/// curl -v http://localhost:5000/health
/// ```
pub async fn health() -> Json<Health> {
    tracing::debug!("Health check requested");

    Json(Health {
        status: "OK",
        timestamp: Utc::now(),
        service: "URL Shortener API",
    })
}
