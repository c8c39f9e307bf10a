use crate::domain::health::{HealthRecord, HealthSnapshot};
use crate::domain::payment::Route;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Lock-free cell holding the current [`HealthSnapshot`]. The poller stores a
/// fresh snapshot each cycle; every worker loads on the hot path without
/// taking a read lock.
#[derive(Clone)]
pub struct HealthCache {
    inner: Arc<ArcSwap<HealthSnapshot>>,
}

impl HealthCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(HealthSnapshot::optimistic())),
        }
    }

    pub fn snapshot(&self) -> Arc<HealthSnapshot> {
        self.inner.load_full()
    }

    pub fn replace(&self, snapshot: HealthSnapshot) {
        self.inner.store(Arc::new(snapshot));
    }

    /// Replaces one route's record, keeping the other as-is.
    pub fn set_route(&self, route: Route, record: HealthRecord) {
        let current = self.inner.load();
        self.inner.store(Arc::new(current.with_route(route, record)));
    }
}

impl Default for HealthCache {
    fn default() -> Self {
        Self::new()
    }
}
