// GET handlers: dashboard, stats, health

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{AppState, dashboard};
use crate::error::ApiError;
use crate::models::Snapshot;
use crate::readiness::Readiness;

/// Site token that selects the global sums instead of one property.
pub const ALL_SITES: &str = "All";

#[derive(Debug, Deserialize)]
pub(super) struct StatsQuery {
    site: Option<String>,
}

async fn ready_snapshot(state: &AppState) -> Result<Arc<Snapshot>, ApiError> {
    let readiness = match &state.pipeline {
        Some(pipeline) => state.gate.current_for_today(pipeline).await,
        None => state.gate.current().await,
    };
    match readiness {
        Readiness::Ready(s) => Ok(s),
        Readiness::Pending => Err(ApiError::NotReady(
            "snapshot is still being computed".into(),
        )),
        Readiness::Failed(reason) => Err(ApiError::NotReady(format!(
            "aggregation failed: {}",
            reason
        ))),
    }
}

/// GET /: HTML dashboard; today's numbers are refetched per render when enabled.
pub(super) async fn index_handler(State(state): State<AppState>) -> Response {
    let snapshot = match ready_snapshot(&state).await {
        Ok(s) => s,
        Err(e) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(dashboard::render_unavailable(&e.to_string())),
            )
                .into_response();
        }
    };

    let today = match (&state.pipeline, state.dashboard.refresh_today_on_render) {
        (Some(pipeline), true) => match pipeline.compute_today().await {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    operation = "refresh_today",
                    "today refresh failed; using snapshot values"
                );
                snapshot.today.clone()
            }
        },
        _ => snapshot.today.clone(),
    };

    Html(dashboard::render(&snapshot, &today)).into_response()
}

/// GET /stats?site=: sums for `All`, else the first record with that property name.
pub(super) async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Response, ApiError> {
    let Some(site) = query.site.filter(|s| !s.is_empty()) else {
        return Err(ApiError::BadRequest("missing query parameter: site".into()));
    };
    let snapshot = ready_snapshot(&state).await?;
    if site == ALL_SITES {
        return Ok(Json(snapshot.sums).into_response());
    }
    match snapshot.find_site(&site) {
        Some(record) => Ok(Json(record).into_response()),
        None => Err(ApiError::NotFound(format!("no site named {:?}", site))),
    }
}

/// GET /health: readiness of the snapshot.
pub(super) async fn health_handler(State(state): State<AppState>) -> Response {
    let readiness = state.gate.current().await;
    let body = match &readiness {
        Readiness::Ready(s) => json!({
            "status": readiness.label(),
            "generated_at": s.generated_at,
            "source": s.source,
            "sites": s.sites.len(),
        }),
        Readiness::Pending => json!({ "status": readiness.label() }),
        Readiness::Failed(reason) => json!({ "status": readiness.label(), "error": reason }),
    };
    let status = match readiness {
        Readiness::Ready(_) => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(body)).into_response()
}
