// HTTP routes: dashboard, stats query, health

mod dashboard;
mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::DashboardConfig;
use crate::pipeline::Pipeline;
use crate::readiness::SnapshotGate;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) gate: SnapshotGate,
    /// Used to refresh today's sessions per dashboard render; None serves the snapshot as is.
    pub(crate) pipeline: Option<Arc<Pipeline>>,
    pub(crate) dashboard: DashboardConfig,
}

pub fn app(
    gate: SnapshotGate,
    pipeline: Option<Arc<Pipeline>>,
    dashboard: DashboardConfig,
) -> Router {
    let state = AppState {
        gate,
        pipeline,
        dashboard,
    };
    Router::new()
        .route("/", get(http::index_handler)) // GET /
        .route("/stats", get(http::stats_handler)) // GET /stats?site=<name|All>
        .route("/health", get(http::health_handler)) // GET /health
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
