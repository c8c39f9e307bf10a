pub mod buffer;
pub mod config;
pub mod domain {
    pub mod health;
    pub mod payment;
}
pub mod gateways;
pub mod health {
    pub mod cache;
    pub mod poller;
}
pub mod http {
    pub mod handlers {
        pub mod health;
        pub mod payments;
        pub mod summary;
    }
}
pub mod repo {
    pub mod transactions_repo;
}
pub mod router;
pub mod service {
    pub mod recorder;
}
pub mod worker;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub buffer: Arc<buffer::IngestBuffer>,
    pub health: health::cache::HealthCache,
    pub recorder: service::recorder::TransactionRecorder,
}
