use crate::service::recorder::PaymentsSummary;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn payments_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let Some((from, to)) = parse_window(&query) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_request"})),
        )
            .into_response();
    };

    match state.recorder.summary(from, to).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        // Store down: serve the static zero-valued body.
        Err(_) => (StatusCode::OK, Json(PaymentsSummary::default())).into_response(),
    }
}

fn parse_window(query: &SummaryQuery) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let from = parse_timestamp(query.from.as_deref()?)?;
    let to = parse_timestamp(query.to.as_deref()?)?;
    Some((from, to))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_params_required() {
        assert!(parse_window(&SummaryQuery {
            from: Some("2024-01-01T09:00:00Z".to_string()),
            to: None
        })
        .is_none());
        assert!(parse_window(&SummaryQuery {
            from: None,
            to: Some("2024-01-01T10:30:00Z".to_string())
        })
        .is_none());
    }

    #[test]
    fn rejects_malformed_timestamps() {
        assert!(parse_window(&SummaryQuery {
            from: Some("yesterday".to_string()),
            to: Some("2024-01-01T10:30:00Z".to_string())
        })
        .is_none());
    }

    #[test]
    fn parses_offset_timestamps_to_utc() {
        let (from, _) = parse_window(&SummaryQuery {
            from: Some("2024-01-01T09:00:00+02:00".to_string()),
            to: Some("2024-01-01T10:30:00Z".to_string()),
        })
        .unwrap();
        assert_eq!(from.to_rfc3339(), "2024-01-01T07:00:00+00:00");
    }
}
