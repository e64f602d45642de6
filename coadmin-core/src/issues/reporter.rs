//! The reporter façade
//!
//! One [`Reporter`] per application. It owns the throttle ledger, the delivery
//! queue and the fixed host metadata. In live mode the background worker is
//! started explicitly with [`Reporter::start`] and stopped with
//! [`Reporter::stop`] (or by dropping the reporter).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::collector::CollectorClient;
use crate::config::ReporterConfig;
use crate::error::Result;
use crate::types::{Fields, Level, Meta};

use super::flush;
use super::queue::DeliveryQueue;
use super::report::{host_meta, ReportBuilder};
use super::sink::DeliverySink;
use super::throttle::ThrottleLedger;
use super::worker::{DeliveryCounters, DeliveryStats, DeliveryWorker, WorkerHandle};
use super::Submission;

pub struct Reporter {
    app_name: String,
    config: ReporterConfig,
    builder: ReportBuilder,
    sink: DeliverySink,
    queue: Arc<DeliveryQueue>,
    counters: Arc<DeliveryCounters>,
    client: Option<CollectorClient>,
    worker: Mutex<Option<WorkerHandle>>,
}

impl Reporter {
    /// Create a reporter for `app_name` with this host's metadata.
    ///
    /// Nothing is spawned here; call [`Reporter::start`] in live mode.
    pub fn new(app_name: &str, config: ReporterConfig) -> Result<Self> {
        Self::with_meta(app_name, config, host_meta())
    }

    /// Create a reporter with explicit process-wide metadata.
    pub fn with_meta(app_name: &str, config: ReporterConfig, meta: Meta) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(DeliveryQueue::new(config.queue_capacity));
        let (sink, client) = if config.live {
            let client = CollectorClient::new(&config)?;
            (DeliverySink::Queue(Arc::clone(&queue)), Some(client))
        } else {
            (
                DeliverySink::File {
                    folder: config.folder.clone(),
                },
                None,
            )
        };

        let builder = ReportBuilder::new(ThrottleLedger::new(config.minimum_interval()), meta)
            .verbose(config.verbose);

        tracing::debug!(
            app = %app_name.to_lowercase(),
            live = config.live,
            folder = %config.folder.display(),
            server = %config.server,
            "Reporter created"
        );

        Ok(Self {
            app_name: app_name.to_lowercase(),
            config,
            builder,
            sink,
            queue,
            counters: Arc::new(DeliveryCounters::default()),
            client,
            worker: Mutex::new(None),
        })
    }

    fn worker(&self) -> MutexGuard<'_, Option<WorkerHandle>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the delivery worker.
    ///
    /// No-op in file mode or when the worker is already running.
    pub fn start(&self) -> Result<()> {
        let Some(client) = &self.client else {
            return Ok(());
        };

        let mut worker = self.worker();
        if worker.as_ref().is_some_and(WorkerHandle::is_running) {
            return Ok(());
        }

        let handle = DeliveryWorker::new(
            client.clone(),
            Arc::clone(&self.queue),
            Arc::clone(&self.counters),
            self.config.poll_interval(),
        )
        .verbose(self.config.verbose)
        .spawn()?;
        *worker = Some(handle);

        tracing::debug!(app = %self.app_name, "Delivery worker started");
        Ok(())
    }

    /// Stop the delivery worker and discard reports it never picked up.
    ///
    /// Returns the number of discarded reports. Safe to call repeatedly.
    pub fn stop(&self) -> usize {
        let Some(handle) = self.worker().take() else {
            return 0;
        };
        handle.stop();

        let abandoned = self.queue.drain().len();
        if abandoned > 0 {
            self.queue.record_dropped(abandoned);
            tracing::warn!(abandoned, "Reporter stopped with undelivered issues");
        }
        abandoned
    }

    pub fn is_running(&self) -> bool {
        self.worker().as_ref().is_some_and(WorkerHandle::is_running)
    }

    /// Report an issue now.
    pub fn add(
        &self,
        issue: &str,
        level: Level,
        extra: Fields,
        options: Fields,
    ) -> Result<Submission> {
        self.add_at(issue, level, extra, options, Utc::now())
    }

    /// Report an issue as if it happened at `now`.
    pub fn add_at(
        &self,
        issue: &str,
        level: Level,
        extra: Fields,
        options: Fields,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        match self
            .builder
            .build(&self.app_name, level, issue, extra, options, now)
        {
            Some(report) => self.sink.submit(report),
            None => Ok(Submission::Suppressed),
        }
    }

    pub fn fatal(&self, issue: &str, extra: Fields, options: Fields) -> Result<Submission> {
        self.add(issue, Level::Fatal, extra, options)
    }

    pub fn error(&self, issue: &str, extra: Fields, options: Fields) -> Result<Submission> {
        self.add(issue, Level::Error, extra, options)
    }

    pub fn warning(&self, issue: &str, extra: Fields, options: Fields) -> Result<Submission> {
        self.add(issue, Level::Warning, extra, options)
    }

    pub fn info(&self, issue: &str, extra: Fields, options: Fields) -> Result<Submission> {
        self.add(issue, Level::Info, extra, options)
    }

    pub fn debug(&self, issue: &str, extra: Fields, options: Fields) -> Result<Submission> {
        self.add(issue, Level::Debug, extra, options)
    }

    /// Block until the worker has taken every queued report, or `max_wait` elapses.
    ///
    /// Always true in file mode.
    pub fn wait_until_empty(&self, max_wait: Duration) -> bool {
        flush::wait_until_empty(&self.queue, max_wait)
    }

    /// Async form of [`Reporter::wait_until_empty`]
    pub async fn wait_until_empty_async(&self, max_wait: Duration) -> bool {
        flush::wait_until_empty_async(&self.queue, max_wait).await
    }

    /// Reports waiting for the worker
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.counters.snapshot(&self.queue)
    }

    /// Lower-cased application name
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn meta(&self) -> &Meta {
        self.builder.meta()
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.stop();
    }
}
