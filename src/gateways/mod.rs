use crate::domain::payment::Route;
use anyhow::Result;
use thiserror::Error;

pub mod http;
pub mod mock;

/// Transport-level failure for a single processor attempt. Status handling is
/// the router's concern; the gateway only reports what the wire did.
#[derive(Debug, Clone, Error)]
pub enum AttemptError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

#[async_trait::async_trait]
pub trait ProcessorGateway: Send + Sync {
    /// POSTs the dispatch body to the route's processor and returns the HTTP
    /// status the processor answered with.
    async fn submit(&self, route: Route, body: &serde_json::Value) -> Result<u16, AttemptError>;
}
