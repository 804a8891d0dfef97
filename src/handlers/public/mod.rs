// Public handlers: no authentication required.
pub mod auth;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::SharedState;

/// GET / - service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Noteful API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "public": ["POST /users", "POST /login", "GET /health"],
            "protected": ["POST /refresh", "/folders[/:id]", "/tags[/:id]", "/notes[/:id]"],
        }
    }))
}

/// GET /health - storage connectivity
pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.repos.backend_name();

    match state.repos.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": backend
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": backend,
                    "error": "database unavailable"
                })),
            )
        }
    }
}

/// Fallback for unmatched routes.
pub async fn not_found() -> crate::error::ApiError {
    crate::error::ApiError::not_found("Not Found")
}
