//! Background delivery of queued reports
//!
//! One worker per live reporter. Each cycle pops the oldest report (the queue
//! lock is released before any network I/O), POSTs it once, then sleeps for the
//! poll interval. Failures are logged and the report is discarded: there is no
//! retry and no re-enqueue.
//!
//! The worker runs on its own OS thread with a private current-thread tokio
//! runtime, so callers need not be async. [`WorkerHandle`] stops it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::watch;

use crate::collector::CollectorClient;
use crate::error::{Error, Result};

use super::queue::DeliveryQueue;

/// Delivery counters shared between the worker and its reporter
#[derive(Debug, Default)]
pub struct DeliveryCounters {
    delivered: AtomicUsize,
    failed: AtomicUsize,
}

/// Snapshot of delivery statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Reports the collector accepted with a 2xx status
    pub delivered: usize,
    /// Reports whose submission failed (transport error or non-2xx)
    pub failed: usize,
    /// Reports discarded without an attempt (queue overflow, abandoned on stop)
    pub dropped: usize,
    /// Reports still waiting in the queue
    pub pending: usize,
}

impl DeliveryCounters {
    /// Combine with the queue's own counters into a snapshot
    pub fn snapshot(&self, queue: &DeliveryQueue) -> DeliveryStats {
        DeliveryStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: queue.dropped(),
            pending: queue.len(),
        }
    }
}

/// Result of a single worker cycle that found work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Delivered { fingerprint: u32 },
    Failed { fingerprint: u32 },
}

/// Drains a [`DeliveryQueue`] into a [`CollectorClient`].
pub struct DeliveryWorker {
    client: CollectorClient,
    queue: Arc<DeliveryQueue>,
    counters: Arc<DeliveryCounters>,
    poll_interval: Duration,
    verbose: bool,
}

impl DeliveryWorker {
    pub fn new(
        client: CollectorClient,
        queue: Arc<DeliveryQueue>,
        counters: Arc<DeliveryCounters>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            client,
            queue,
            counters,
            poll_interval,
            verbose: false,
        }
    }

    /// Log every cycle, including idle ones
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Deliver the oldest pending report, if any.
    pub async fn run_once(&self) -> Option<CycleOutcome> {
        // The guard inside pop() is dropped before the request starts
        let report = self.queue.pop()?;
        let fingerprint = report.fingerprint;

        tracing::debug!(fingerprint, server = %self.client.server(), "Sending issue to collector");

        match self.client.send_issue(&report).await {
            Ok(status) => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(fingerprint, status = %status, "Issue delivered");
                Some(CycleOutcome::Delivered { fingerprint })
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(fingerprint, error = %e, "Failed to deliver issue; discarded");
                Some(CycleOutcome::Failed { fingerprint })
            }
        }
    }

    /// Poll-and-sleep loop until `shutdown` flips to true or its sender is dropped.
    ///
    /// An in-flight request is allowed to finish (it is bounded by the client
    /// timeout); the sleep between cycles is cut short.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        tracing::debug!(
            server = %self.client.server(),
            poll_interval = ?self.poll_interval,
            "Starting delivery worker"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_once().await;

            if self.verbose {
                tracing::debug!(pending = self.queue.len(), "Delivery worker sleeping");
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::debug!(pending = self.queue.len(), "Delivery worker stopped");
    }

    /// Run the loop on a dedicated thread.
    pub fn spawn(self) -> Result<WorkerHandle> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Collector(format!("failed to create runtime: {}", e)))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let thread = std::thread::Builder::new()
            .name("coadmin-delivery".to_string())
            .spawn(move || runtime.block_on(self.run(shutdown_rx)))?;

        Ok(WorkerHandle {
            shutdown: shutdown_tx,
            thread: Some(thread),
        })
    }
}

/// Owns a running worker thread; stopping (or dropping) it joins the thread.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: watch::Sender<bool>,
    thread: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    /// Signal the worker and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn shutdown_and_join(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Delivery worker thread panicked");
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
