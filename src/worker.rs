use crate::buffer::IngestBuffer;
use crate::domain::payment::PaymentPayload;
use crate::router::{DispatchError, GatewayRouter};
use std::sync::Arc;
use std::time::Duration;

/// Fixed-size pool of dispatch workers over the ingest buffer.
///
/// Each worker slot runs under a small supervisor loop: if the worker task
/// panics, the slot releases its in-flight count and a replacement is
/// spawned, so the live worker count stays at `concurrency`.
pub struct WorkerPool {
    pub buffer: Arc<IngestBuffer>,
    pub router: Arc<GatewayRouter>,
    pub concurrency: usize,
    pub idle_backoff: Duration,
    pub requeue_cooldown: Duration,
}

impl WorkerPool {
    pub fn spawn(&self) {
        for id in 0..self.concurrency {
            let worker = Worker {
                id,
                buffer: self.buffer.clone(),
                router: self.router.clone(),
                idle_backoff: self.idle_backoff,
                requeue_cooldown: self.requeue_cooldown,
            };
            tokio::spawn(supervise(worker));
        }
        tracing::info!(workers = self.concurrency, "worker pool started");
    }
}

async fn supervise(worker: Worker) {
    loop {
        let handle = tokio::spawn(worker.clone().run());
        match handle.await {
            Ok(()) => break,
            Err(e) => {
                worker.buffer.worker_finished();
                tracing::error!(worker = worker.id, "worker died, respawning: {}", e);
            }
        }
    }
}

#[derive(Clone)]
struct Worker {
    id: usize,
    buffer: Arc<IngestBuffer>,
    router: Arc<GatewayRouter>,
    idle_backoff: Duration,
    requeue_cooldown: Duration,
}

impl Worker {
    async fn run(self) {
        loop {
            match self.buffer.dequeue() {
                Some((payload, wait_ms)) => self.process(payload, wait_ms).await,
                None => tokio::time::sleep(self.idle_backoff).await,
            }
        }
    }

    async fn process(&self, payload: PaymentPayload, wait_ms: u64) {
        tracing::trace!(worker = self.id, wait_ms, "dequeued payment");

        self.buffer.worker_started();
        let outcome = self.router.dispatch(&payload).await;
        self.buffer.worker_finished();

        match outcome {
            Ok(()) => {}
            Err(
                err @ (DispatchError::GatewaysUnavailable | DispatchError::FallbackFailed { .. }),
            ) => {
                tracing::debug!(worker = self.id, "dispatch failed, requeueing: {}", err);
                // The original payload goes back, never the augmented body:
                // the next dispatch stamps a fresh requestedAt.
                self.requeue(payload);
                tokio::time::sleep(self.requeue_cooldown).await;
            }
            Err(err) => {
                tracing::warn!(worker = self.id, "dropping undispatchable payment: {}", err);
            }
        }
    }

    fn requeue(&self, payload: PaymentPayload) {
        if self.buffer.enqueue(payload).is_err() {
            tracing::warn!(worker = self.id, "queue full on requeue, payment lost");
        }
    }
}
