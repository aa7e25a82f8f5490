pub mod calendar;
pub mod health;

use std::sync::Arc;

use axum::{routing::get, Router};
use hpc_core::{feed_client::FeedUrl, policy::PolicyConfig, serializer::FeedMetadata};
use tower_http::trace::TraceLayer;

/// Read-only state shared by all requests.
#[derive(Debug)]
pub struct AppState {
    pub feed_url: FeedUrl,
    pub metadata: FeedMetadata,
    pub defaults: PolicyConfig,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/calendar.ics", get(calendar::handler))
        .route("/health", get(health::handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
