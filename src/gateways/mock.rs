use crate::domain::payment::Route;
use crate::gateways::{AttemptError, ProcessorGateway};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Scripted outcome for one route of the mock processor.
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    Status(u16),
    Timeout,
    ConnectionRefused,
}

/// In-process stand-in for the external processors. Tests script each route's
/// behavior and read back how many calls it received.
pub struct MockProcessor {
    default_behavior: Mutex<MockBehavior>,
    fallback_behavior: Mutex<MockBehavior>,
    pub default_calls: AtomicUsize,
    pub fallback_calls: AtomicUsize,
    bodies: Mutex<Vec<(Route, serde_json::Value)>>,
}

impl MockProcessor {
    pub fn new(default_behavior: MockBehavior, fallback_behavior: MockBehavior) -> Self {
        Self {
            default_behavior: Mutex::new(default_behavior),
            fallback_behavior: Mutex::new(fallback_behavior),
            default_calls: AtomicUsize::new(0),
            fallback_calls: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        }
    }

    pub fn set_behavior(&self, route: Route, behavior: MockBehavior) {
        let slot = match route {
            Route::Default => &self.default_behavior,
            Route::Fallback => &self.fallback_behavior,
        };
        *slot.lock().unwrap() = behavior;
    }

    pub fn calls(&self, route: Route) -> usize {
        match route {
            Route::Default => self.default_calls.load(Ordering::Relaxed),
            Route::Fallback => self.fallback_calls.load(Ordering::Relaxed),
        }
    }

    /// Every body this processor has been asked to accept, in arrival order.
    pub fn bodies(&self) -> Vec<(Route, serde_json::Value)> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ProcessorGateway for MockProcessor {
    async fn submit(
        &self,
        route: Route,
        body: &serde_json::Value,
    ) -> Result<u16, AttemptError> {
        let behavior = {
            let slot = match route {
                Route::Default => &self.default_behavior,
                Route::Fallback => &self.fallback_behavior,
            };
            *slot.lock().unwrap()
        };

        match route {
            Route::Default => self.default_calls.fetch_add(1, Ordering::Relaxed),
            Route::Fallback => self.fallback_calls.fetch_add(1, Ordering::Relaxed),
        };
        self.bodies.lock().unwrap().push((route, body.clone()));

        match behavior {
            MockBehavior::Status(status) => Ok(status),
            MockBehavior::Timeout => Err(AttemptError::Timeout),
            MockBehavior::ConnectionRefused => {
                Err(AttemptError::Transport("connection refused".to_string()))
            }
        }
    }
}
