use crate::domain::payment::PaymentPayload;
use crossbeam_skiplist::SkipMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("payment queue is full")]
pub struct QueueFull;

/// Ordering key for buffered payments: monotonic nanoseconds since process
/// start, tie-broken by a process-unique tag. The tag carries no meaning
/// beyond uniqueness; the monotonic reading is the ordering truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SequenceKey {
    nanos: u64,
    tag: u64,
}

struct QueueEntry {
    payload: PaymentPayload,
    enqueued_at: Instant,
}

/// Bounded FIFO buffer between the ingress handlers and the worker pool.
///
/// Producers insert into a lock-free skiplist keyed by [`SequenceKey`];
/// consumers take the smallest key. Both sides run without caller-level
/// locking, so any number of request tasks can enqueue while the whole worker
/// pool dequeues. The size counter is a hint maintained by atomic add/sub:
/// two producers racing the capacity check may land marginally above the cap,
/// which is bounded by the producer count per instant and accepted.
pub struct IngestBuffer {
    entries: SkipMap<SequenceKey, QueueEntry>,
    queue_size: AtomicUsize,
    in_flight: AtomicUsize,
    next_tag: AtomicU64,
    origin: Instant,
    max_size: Option<usize>,
}

impl IngestBuffer {
    /// `max_size = None` leaves the buffer unbounded.
    pub fn new(max_size: Option<usize>) -> Self {
        Self {
            entries: SkipMap::new(),
            queue_size: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            next_tag: AtomicU64::new(0),
            origin: Instant::now(),
            max_size,
        }
    }

    /// Non-blocking admission. The only failure is a full queue.
    pub fn enqueue(&self, payload: PaymentPayload) -> Result<(), QueueFull> {
        if let Some(max) = self.max_size {
            if self.queue_size.load(Ordering::Relaxed) >= max {
                return Err(QueueFull);
            }
        }
        self.entries.insert(
            self.next_key(),
            QueueEntry {
                payload,
                enqueued_at: Instant::now(),
            },
        );
        self.queue_size.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Removes and returns the oldest entry plus its queue wait in
    /// milliseconds. When two consumers observe the same head, `remove`
    /// arbitrates: exactly one wins, the loser re-reads the front.
    pub fn dequeue(&self) -> Option<(PaymentPayload, u64)> {
        loop {
            let entry = self.entries.front()?;
            if entry.remove() {
                let value = entry.value();
                let wait_ms = value.enqueued_at.elapsed().as_millis() as u64;
                self.decrement_clamped(&self.queue_size);
                return Some((value.payload.clone(), wait_ms));
            }
        }
    }

    pub fn size(&self) -> usize {
        self.queue_size.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    pub fn worker_started(&self) {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
    }

    pub fn worker_finished(&self) {
        self.decrement_clamped(&self.in_flight);
    }

    fn decrement_clamped(&self, counter: &AtomicUsize) {
        let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
            Some(v.saturating_sub(1))
        });
    }

    fn next_key(&self) -> SequenceKey {
        SequenceKey {
            nanos: self.origin.elapsed().as_nanos() as u64,
            tag: self.next_tag.fetch_add(1, Ordering::Relaxed),
        }
    }
}
