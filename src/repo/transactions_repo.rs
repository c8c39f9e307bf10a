use crate::domain::payment::Route;
use crate::service::recorder::{PaymentsSummary, RouteSummary};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub correlation_id: Uuid,
    pub amount: f64,
    pub route: Route,
    pub inserted_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TransactionsRepo {
    pub pool: PgPool,
}

impl TransactionsRepo {
    pub async fn insert(&self, tx: &NewTransaction) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (correlation_id, amount, route, inserted_at)
            VALUES ($1, $2::numeric, $3, $4)
            "#,
        )
        .bind(tx.correlation_id)
        .bind(tx.amount)
        .bind(tx.route.as_str())
        .bind(tx.inserted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Per-route counts and amount sums over `inserted_at ∈ [from, to)`.
    /// Amounts are summed as NUMERIC in the store and only cast to float8 on
    /// the way out.
    pub async fn totals_by_route(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<PaymentsSummary> {
        let rows = sqlx::query(
            r#"
            SELECT route,
                   COUNT(*) AS total_requests,
                   COALESCE(SUM(amount), 0)::float8 AS total_amount
            FROM transactions
            WHERE inserted_at >= $1 AND inserted_at < $2
            GROUP BY route
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let mut summary = PaymentsSummary::default();
        for row in rows {
            let route: String = row.get("route");
            let totals = RouteSummary {
                total_requests: row.get("total_requests"),
                total_amount: row.get("total_amount"),
            };
            match route.as_str() {
                "default" => summary.default = totals,
                "fallback" => summary.fallback = totals,
                other => tracing::warn!(route = other, "unknown route in transactions table"),
            }
        }

        Ok(summary)
    }
}
