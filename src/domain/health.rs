use crate::domain::payment::Route;
use serde::{Deserialize, Serialize};

/// Sentinel latency for a route whose health could not be read.
pub const UNKNOWN_RESPONSE_TIME_MS: u64 = u64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthSource {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub failing: bool,
    pub min_response_time_ms: u64,
    pub checked_at: chrono::DateTime<chrono::Utc>,
    pub source: HealthSource,
}

impl HealthRecord {
    /// Seed state: willing to dispatch until the first poll lands.
    pub fn optimistic() -> Self {
        Self {
            failing: false,
            min_response_time_ms: 0,
            checked_at: chrono::Utc::now(),
            source: HealthSource::Ok,
        }
    }

    /// Replacement record when a poll fails. Biases routing away from the
    /// route without flapping `checked_at`.
    pub fn from_poll_error(previous: &HealthRecord) -> Self {
        Self {
            failing: true,
            min_response_time_ms: UNKNOWN_RESPONSE_TIME_MS,
            checked_at: previous.checked_at,
            source: HealthSource::Error,
        }
    }

    pub fn is_healthy(&self, slow_threshold_ms: u64) -> bool {
        !self.failing && self.min_response_time_ms < slow_threshold_ms
    }
}

/// Immutable pair of per-route records. Installed whole by the poller and
/// read whole by the router, so readers never see a half-updated pair.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    pub default: HealthRecord,
    pub fallback: HealthRecord,
}

impl HealthSnapshot {
    pub fn optimistic() -> Self {
        Self {
            default: HealthRecord::optimistic(),
            fallback: HealthRecord::optimistic(),
        }
    }

    pub fn route(&self, route: Route) -> &HealthRecord {
        match route {
            Route::Default => &self.default,
            Route::Fallback => &self.fallback,
        }
    }

    pub fn with_route(&self, route: Route, record: HealthRecord) -> Self {
        let mut next = self.clone();
        match route {
            Route::Default => next.default = record,
            Route::Fallback => next.fallback = record,
        }
        next
    }
}
