use crate::domain::payment::Route;
use crate::gateways::{AttemptError, ProcessorGateway};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Reqwest-backed processor client. Outbound connections are pooled per
/// client; `pool_count > 1` stripes requests over several clients round-robin
/// so one saturated pool does not stall every worker.
pub struct HttpProcessorGateway {
    clients: Vec<reqwest::Client>,
    next_client: AtomicUsize,
    default_base_url: String,
    fallback_base_url: String,
    request_timeout: Duration,
}

impl HttpProcessorGateway {
    pub fn new(
        default_base_url: String,
        fallback_base_url: String,
        request_timeout: Duration,
        pool_size: usize,
        pool_count: usize,
        connect_budget: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut clients = Vec::with_capacity(pool_count.max(1));
        for _ in 0..pool_count.max(1) {
            let mut builder = reqwest::Client::builder().pool_max_idle_per_host(pool_size);
            if let Some(budget) = connect_budget {
                builder = builder.connect_timeout(budget);
            }
            clients.push(builder.build()?);
        }

        Ok(Self {
            clients,
            next_client: AtomicUsize::new(0),
            default_base_url,
            fallback_base_url,
            request_timeout,
        })
    }

    fn base_url(&self, route: Route) -> &str {
        match route {
            Route::Default => &self.default_base_url,
            Route::Fallback => &self.fallback_base_url,
        }
    }

    fn client(&self) -> &reqwest::Client {
        let idx = self.next_client.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        &self.clients[idx]
    }
}

#[async_trait::async_trait]
impl ProcessorGateway for HttpProcessorGateway {
    async fn submit(
        &self,
        route: Route,
        body: &serde_json::Value,
    ) -> Result<u16, AttemptError> {
        let url = format!("{}/payments", self.base_url(route));
        let resp = self
            .client()
            .post(url)
            .json(body)
            .timeout(self.request_timeout)
            .send()
            .await;

        match resp {
            Ok(r) => Ok(r.status().as_u16()),
            Err(e) if e.is_timeout() => Err(AttemptError::Timeout),
            Err(e) => Err(AttemptError::Transport(e.to_string())),
        }
    }
}
