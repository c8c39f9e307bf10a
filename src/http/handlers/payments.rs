use crate::domain::payment::PaymentPayload;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Admission only: the body is taken as-is (no validation, no UTF-8 check)
/// and the client is answered before any processor work happens.
pub async fn submit_payment(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    match state.buffer.enqueue(PaymentPayload::new(body)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "queue_full"})),
        )
            .into_response(),
    }
}
