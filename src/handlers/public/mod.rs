// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service info and the storage health probe.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - Service name, version and route overview
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/login, /auth/me",
                "folders": "/folders[/:id], /folders/by-parent?parent_id=",
                "notes": "/notes[/:id], /notes/by-folder?folder_id=",
                "projects": "/projects[/:id]",
                "time_entries": "/time-entries[/:id[/assign-project]]",
                "time_box_entries": "/time-box-entries[/:id[/assign-project]]",
            }
        }
    }))
}

/// GET /health - Storage connectivity probe
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": state.backend_name
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": state.backend_name
                    }
                })),
            )
        }
    }
}
