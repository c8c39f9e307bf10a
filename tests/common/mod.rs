use chrono::{DateTime, Utc};
use payments_ingress::domain::payment::{PaymentPayload, Route};
use payments_ingress::gateways::mock::{MockBehavior, MockProcessor};
use payments_ingress::health::cache::HealthCache;
use payments_ingress::repo::transactions_repo::NewTransaction;
use payments_ingress::router::{GatewayRouter, SuccessPolicy};
use payments_ingress::service::recorder::{
    PaymentsSummary, TransactionRecorder, TransactionStore,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Transaction store kept in memory for router and worker tests.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<NewTransaction>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn rows(&self) -> Vec<NewTransaction> {
        self.rows.lock().unwrap().clone()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }
}

#[async_trait::async_trait]
impl TransactionStore for MemoryStore {
    async fn insert(&self, tx: &NewTransaction) -> anyhow::Result<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            anyhow::bail!("store offline");
        }
        self.rows.lock().unwrap().push(tx.clone());
        Ok(())
    }

    async fn totals_by_route(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<PaymentsSummary> {
        if self.unavailable.load(Ordering::Relaxed) {
            anyhow::bail!("store offline");
        }

        let mut summary = PaymentsSummary::default();
        for row in self.rows.lock().unwrap().iter() {
            if row.inserted_at < from || row.inserted_at >= to {
                continue;
            }
            let totals = match row.route {
                Route::Default => &mut summary.default,
                Route::Fallback => &mut summary.fallback,
            };
            totals.total_requests += 1;
            totals.total_amount += row.amount;
        }
        Ok(summary)
    }
}

pub struct Harness {
    pub router: Arc<GatewayRouter>,
    pub processor: Arc<MockProcessor>,
    pub store: Arc<MemoryStore>,
    pub health: HealthCache,
}

/// Router wired to a scripted processor and an in-memory store, both routes
/// healthy until a test says otherwise.
pub fn harness(default_behavior: MockBehavior, fallback_behavior: MockBehavior) -> Harness {
    let processor = Arc::new(MockProcessor::new(default_behavior, fallback_behavior));
    let store = Arc::new(MemoryStore::default());
    let health = HealthCache::new();

    let router = Arc::new(GatewayRouter {
        gateway: processor.clone(),
        recorder: TransactionRecorder::new(store.clone()),
        health: health.clone(),
        success_policy: SuccessPolicy::default(),
        slow_threshold_ms: 30,
    });

    Harness {
        router,
        processor,
        store,
        health,
    }
}

pub fn payload(correlation_id: &str, amount: f64) -> PaymentPayload {
    PaymentPayload::from_json(&serde_json::json!({
        "correlationId": correlation_id,
        "amount": amount,
    }))
}
