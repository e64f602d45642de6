//! In-memory FIFO of reports awaiting network delivery
//!
//! Pushes never fail. When the queue is at capacity the oldest pending report
//! is evicted to make room, so a long collector outage costs old reports
//! rather than unbounded memory.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::types::Report;

#[derive(Debug)]
pub struct DeliveryQueue {
    items: Mutex<VecDeque<Report>>,
    capacity: usize,
    dropped: AtomicUsize,
}

impl DeliveryQueue {
    /// Create a queue holding at most `capacity` reports (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            dropped: AtomicUsize::new(0),
        }
    }

    fn items(&self) -> MutexGuard<'_, VecDeque<Report>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `report` to the tail, returning the queue length afterwards.
    pub fn push(&self, report: Report) -> usize {
        let mut items = self.items();
        if items.len() >= self.capacity {
            if let Some(evicted) = items.pop_front() {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    fingerprint = evicted.fingerprint,
                    capacity = self.capacity,
                    "Delivery queue full; dropped oldest report"
                );
            }
        }
        items.push_back(report);
        items.len()
    }

    /// Remove and return the oldest pending report.
    pub fn pop(&self) -> Option<Report> {
        self.items().pop_front()
    }

    /// Remove every pending report, oldest first.
    pub fn drain(&self) -> Vec<Report> {
        self.items().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reports discarded without a delivery attempt
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Count `n` reports as discarded (used when pending reports are abandoned on stop).
    pub(crate) fn record_dropped(&self, n: usize) {
        self.dropped.fetch_add(n, Ordering::Relaxed);
    }
}
