use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use log::warn;
use serde_json::json;

use crate::openapi::HEALTH_TAG;
use crate::state::AppState;
use crate::store::DrinkStore;

/// Basic health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Store is unavailable")
    )
)]
pub(crate) async fn health_check(State(state): State<AppState>) -> Response {
    match state.store.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))).into_response(),
        Err(err) => {
            warn!("Store health check failed: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "error", "error": err})),
            )
                .into_response()
        }
    }
}

pub(super) fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
