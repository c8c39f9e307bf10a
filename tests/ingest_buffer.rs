mod common;

use common::payload;
use payments_ingress::buffer::{IngestBuffer, QueueFull};
use std::collections::HashSet;
use std::sync::Arc;

fn correlation(buffer: &IngestBuffer) -> Option<String> {
    buffer.dequeue().and_then(|(p, _)| p.correlation_id())
}

#[test]
fn drains_in_insertion_order() {
    let buffer = IngestBuffer::new(None);
    for i in 0..5 {
        buffer.enqueue(payload(&format!("p{i}"), 1.0)).unwrap();
    }

    for i in 0..5 {
        assert_eq!(correlation(&buffer).as_deref(), Some(format!("p{i}").as_str()));
    }
    assert!(buffer.dequeue().is_none());
}

#[test]
fn requeued_payload_moves_to_the_tail() {
    let buffer = IngestBuffer::new(None);
    buffer.enqueue(payload("first", 1.0)).unwrap();
    buffer.enqueue(payload("second", 1.0)).unwrap();

    let (first, _) = buffer.dequeue().unwrap();
    buffer.enqueue(first).unwrap();

    assert_eq!(correlation(&buffer).as_deref(), Some("second"));
    assert_eq!(correlation(&buffer).as_deref(), Some("first"));
}

#[test]
fn rejects_when_full() {
    let buffer = IngestBuffer::new(Some(2));
    buffer.enqueue(payload("a", 1.0)).unwrap();
    buffer.enqueue(payload("b", 1.0)).unwrap();

    assert_eq!(buffer.enqueue(payload("c", 1.0)), Err(QueueFull));
    assert_eq!(buffer.size(), 2);

    buffer.dequeue().unwrap();
    assert!(buffer.enqueue(payload("c", 1.0)).is_ok());
}

#[test]
fn counters_track_enqueues_and_dequeues() {
    let buffer = IngestBuffer::new(None);
    for i in 0..10 {
        buffer.enqueue(payload(&format!("p{i}"), 1.0)).unwrap();
    }
    assert_eq!(buffer.size(), 10);

    for _ in 0..4 {
        buffer.dequeue().unwrap();
    }
    assert_eq!(buffer.size(), 6);
}

#[test]
fn in_flight_tracks_worker_markers_and_clamps_at_zero() {
    let buffer = IngestBuffer::new(None);
    assert_eq!(buffer.in_flight(), 0);

    buffer.worker_started();
    buffer.worker_started();
    assert_eq!(buffer.in_flight(), 2);

    buffer.worker_finished();
    buffer.worker_finished();
    buffer.worker_finished();
    assert_eq!(buffer.in_flight(), 0);
}

#[test]
fn concurrent_consumers_each_take_distinct_entries() {
    let buffer = Arc::new(IngestBuffer::new(None));
    let total = 1_000;
    for i in 0..total {
        buffer.enqueue(payload(&format!("p{i}"), 1.0)).unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let buffer = buffer.clone();
        handles.push(std::thread::spawn(move || {
            let mut taken = Vec::new();
            while let Some((p, _)) = buffer.dequeue() {
                taken.push(p.correlation_id().unwrap());
            }
            taken
        }));
    }

    let mut seen = HashSet::new();
    let mut count = 0;
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(seen.insert(id), "entry dequeued twice");
            count += 1;
        }
    }

    assert_eq!(count, total);
    assert_eq!(buffer.size(), 0);
}

#[test]
fn concurrent_producers_land_every_entry() {
    let buffer = Arc::new(IngestBuffer::new(None));
    let per_thread = 250usize;

    let mut handles = Vec::new();
    for t in 0..4 {
        let buffer = buffer.clone();
        handles.push(std::thread::spawn(move || {
            for i in 0..per_thread {
                buffer.enqueue(payload(&format!("t{t}-{i}"), 1.0)).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(buffer.size(), 4 * per_thread);

    let mut seen = HashSet::new();
    while let Some((p, _)) = buffer.dequeue() {
        assert!(seen.insert(p.correlation_id().unwrap()));
    }
    assert_eq!(seen.len(), 4 * per_thread);
}
