use axum::Json;
use chrono::Local;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    timestamp: String,
}

/// Report that the server is up, the upstream is not contacted.
pub async fn handler() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: Local::now().to_rfc3339(),
    })
}
