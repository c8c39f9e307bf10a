use crate::domain::payment::Route;
use crate::repo::transactions_repo::{NewTransaction, TransactionsRepo};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub total_requests: i64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PaymentsSummary {
    pub default: RouteSummary,
    pub fallback: RouteSummary,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("transaction store unavailable")]
pub struct StoreUnavailable;

/// Persistence seam so tests can swap in an in-memory store.
#[async_trait::async_trait]
pub trait TransactionStore: Send + Sync {
    async fn insert(&self, tx: &NewTransaction) -> anyhow::Result<()>;
    async fn totals_by_route(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<PaymentsSummary>;
}

#[async_trait::async_trait]
impl TransactionStore for TransactionsRepo {
    async fn insert(&self, tx: &NewTransaction) -> anyhow::Result<()> {
        TransactionsRepo::insert(self, tx).await
    }

    async fn totals_by_route(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<PaymentsSummary> {
        TransactionsRepo::totals_by_route(self, from, to).await
    }
}

/// Writes completed dispatches and answers window summaries.
///
/// `store_success` is strictly best-effort: a dispatch that the processor
/// accepted is done from the pipeline's point of view, so store trouble is
/// logged and swallowed rather than bounced back to the worker.
#[derive(Clone)]
pub struct TransactionRecorder {
    store: Arc<dyn TransactionStore>,
}

impl TransactionRecorder {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    pub async fn store_success(&self, dispatch_body: &Value, route: Route) {
        let Some(record) = record_from_body(dispatch_body, route) else {
            tracing::warn!(route = %route, "accepted payment missing persistable fields, skipping");
            return;
        };

        if let Err(err) = self.store.insert(&record).await {
            tracing::warn!(
                route = %route,
                correlation_id = %record.correlation_id,
                "failed to persist transaction: {err:#}"
            );
        }
    }

    pub async fn summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<PaymentsSummary, StoreUnavailable> {
        self.store.totals_by_route(from, to).await.map_err(|err| {
            tracing::error!("summary query failed: {err:#}");
            StoreUnavailable
        })
    }
}

fn record_from_body(body: &Value, route: Route) -> Option<NewTransaction> {
    let correlation_id = body.get("correlationId")?.as_str()?.parse().ok()?;
    let amount = body.get("amount")?.as_f64()?;
    let requested_at = body.get("requestedAt")?.as_str()?;
    let inserted_at = DateTime::parse_from_rfc3339(requested_at)
        .ok()?
        .with_timezone(&Utc);

    Some(NewTransaction {
        correlation_id,
        amount,
        route,
        inserted_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_record_from_dispatch_body() {
        let body = json!({
            "correlationId": "4a7901b8-7d26-4d9d-aa19-4dc1c7cf60b3",
            "amount": 19.90,
            "requestedAt": "2024-01-01T10:00:00.000000Z"
        });

        let record = record_from_body(&body, Route::Default).unwrap();
        assert_eq!(
            record.correlation_id.to_string(),
            "4a7901b8-7d26-4d9d-aa19-4dc1c7cf60b3"
        );
        assert_eq!(record.amount, 19.90);
        assert_eq!(record.route, Route::Default);
    }

    #[test]
    fn rejects_body_without_required_fields() {
        assert!(record_from_body(&json!({"amount": 1.0}), Route::Default).is_none());
        assert!(record_from_body(
            &json!({"correlationId": "not-a-uuid", "amount": 1.0, "requestedAt": "2024-01-01T10:00:00Z"}),
            Route::Default
        )
        .is_none());
    }
}
