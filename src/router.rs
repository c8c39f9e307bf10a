use crate::domain::payment::{PaymentPayload, Route};
use crate::gateways::{AttemptError, ProcessorGateway};
use crate::health::cache::HealthCache;
use crate::service::recorder::TransactionRecorder;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no healthy payment processor")]
    GatewaysUnavailable,
    #[error("default: {default}; fallback: {fallback}")]
    FallbackFailed { default: String, fallback: String },
    #[error("payload is not a JSON object")]
    UnusablePayload,
}

/// Which processor statuses count as an accepted payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessPolicy {
    /// 2xx, plus 409 because processors answer 409 for an idempotent retry
    /// of an already-accepted payment.
    TwoXxOrConflict,
    /// Anything below 500.
    Below500,
}

impl SuccessPolicy {
    pub fn accepts(self, status: u16) -> bool {
        match self {
            SuccessPolicy::TwoXxOrConflict => (200..300).contains(&status) || status == 409,
            SuccessPolicy::Below500 => (200..500).contains(&status),
        }
    }
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        SuccessPolicy::TwoXxOrConflict
    }
}

#[derive(Debug, Error)]
enum AttemptFailure {
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error(transparent)]
    Request(AttemptError),
}

/// Routes one payload to a processor, consulting the health snapshot first.
///
/// Healthy default wins; a retryable default failure falls through to the
/// fallback when that one is healthy; with neither healthy no request is
/// made at all. A transaction row is written exactly once per dispatch and
/// only after a success status.
pub struct GatewayRouter {
    pub gateway: Arc<dyn ProcessorGateway>,
    pub recorder: TransactionRecorder,
    pub health: HealthCache,
    pub success_policy: SuccessPolicy,
    pub slow_threshold_ms: u64,
}

impl GatewayRouter {
    pub async fn dispatch(&self, payload: &PaymentPayload) -> Result<(), DispatchError> {
        let snapshot = self.health.snapshot();
        let default_healthy = snapshot.default.is_healthy(self.slow_threshold_ms);
        let fallback_healthy = snapshot.fallback.is_healthy(self.slow_threshold_ms);

        if !default_healthy && !fallback_healthy {
            return Err(DispatchError::GatewaysUnavailable);
        }

        let body = payload
            .dispatch_body(chrono::Utc::now())
            .ok_or(DispatchError::UnusablePayload)?;

        if default_healthy {
            let default_failure = match self.attempt(Route::Default, &body).await {
                Ok(()) => return Ok(()),
                Err(failure) => failure,
            };

            if fallback_healthy {
                match self.attempt(Route::Fallback, &body).await {
                    Ok(()) => Ok(()),
                    Err(fallback_failure) => Err(DispatchError::FallbackFailed {
                        default: default_failure.to_string(),
                        fallback: fallback_failure.to_string(),
                    }),
                }
            } else {
                Err(DispatchError::FallbackFailed {
                    default: default_failure.to_string(),
                    fallback: "unhealthy, not attempted".to_string(),
                })
            }
        } else {
            match self.attempt(Route::Fallback, &body).await {
                Ok(()) => Ok(()),
                Err(fallback_failure) => Err(DispatchError::FallbackFailed {
                    default: "unhealthy, not attempted".to_string(),
                    fallback: fallback_failure.to_string(),
                }),
            }
        }
    }

    async fn attempt(
        &self,
        route: Route,
        body: &serde_json::Value,
    ) -> Result<(), AttemptFailure> {
        match self.gateway.submit(route, body).await {
            Ok(status) if self.success_policy.accepts(status) => {
                self.recorder.store_success(body, route).await;
                Ok(())
            }
            Ok(status) => Err(AttemptFailure::UnexpectedStatus(status)),
            Err(e) => Err(AttemptFailure::Request(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_counts_as_success() {
        let policy = SuccessPolicy::TwoXxOrConflict;
        assert!(policy.accepts(200));
        assert!(policy.accepts(204));
        assert!(policy.accepts(299));
        assert!(policy.accepts(409));
        assert!(!policy.accepts(400));
        assert!(!policy.accepts(500));
    }

    #[test]
    fn wide_policy_accepts_client_errors() {
        let policy = SuccessPolicy::Below500;
        assert!(policy.accepts(422));
        assert!(!policy.accepts(502));
    }
}
