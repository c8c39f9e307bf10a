use crate::domain::health::{HealthRecord, HealthSource};
use crate::domain::payment::Route;
use crate::health::cache::HealthCache;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceHealthBody {
    failing: bool,
    min_response_time: MinResponseTime,
}

/// Processors report `minResponseTime` as an integer, a float, or a quoted
/// number depending on the vendor; all three forms are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MinResponseTime {
    Number(f64),
    Text(String),
}

impl MinResponseTime {
    fn as_millis(&self) -> Option<u64> {
        let raw = match self {
            MinResponseTime::Number(n) => *n,
            MinResponseTime::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        if raw.is_finite() && raw >= 0.0 {
            Some(raw as u64)
        } else {
            None
        }
    }
}

pub struct HealthPoller {
    pub cache: HealthCache,
    pub client: reqwest::Client,
    pub default_health_url: String,
    pub fallback_health_url: String,
    pub interval: Duration,
    pub deadline: Duration,
}

impl HealthPoller {
    pub async fn run(self) {
        loop {
            self.tick().await;
            tokio::time::sleep(self.interval).await;
        }
    }

    async fn tick(&self) {
        for route in [Route::Default, Route::Fallback] {
            let record = self.poll_route(route).await;
            self.cache.set_route(route, record);
        }
    }

    async fn poll_route(&self, route: Route) -> HealthRecord {
        let url = match route {
            Route::Default => &self.default_health_url,
            Route::Fallback => &self.fallback_health_url,
        };
        let previous = self.cache.snapshot().route(route).clone();

        let resp = self
            .client
            .get(url)
            .timeout(self.deadline)
            .send()
            .await;

        match resp {
            Ok(r) if r.status() == StatusCode::OK => match r.json::<ServiceHealthBody>().await {
                Ok(body) => match body.min_response_time.as_millis() {
                    Some(min_response_time_ms) => HealthRecord {
                        failing: body.failing,
                        min_response_time_ms,
                        checked_at: chrono::Utc::now(),
                        source: HealthSource::Ok,
                    },
                    None => {
                        tracing::warn!(route = %route, "unusable minResponseTime in health body");
                        HealthRecord::from_poll_error(&previous)
                    }
                },
                Err(e) => {
                    tracing::warn!(route = %route, "failed to decode health body: {}", e);
                    HealthRecord::from_poll_error(&previous)
                }
            },
            Ok(r) if r.status() == StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!(route = %route, "health poll rate limited");
                HealthRecord::from_poll_error(&previous)
            }
            Ok(r) => {
                tracing::warn!(route = %route, status = r.status().as_u16(), "unexpected health poll status");
                HealthRecord::from_poll_error(&previous)
            }
            Err(e) => {
                tracing::warn!(route = %route, "health poll failed: {}", e);
                HealthRecord::from_poll_error(&previous)
            }
        }
    }
}
