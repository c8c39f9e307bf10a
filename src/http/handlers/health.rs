use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.health.snapshot();
    Json(json!({
        "status": "ok",
        "queue": {
            "queue_size": state.buffer.size(),
            "in_flight": state.buffer.in_flight(),
        },
        "processors": &*snapshot,
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "not_found"})))
}
