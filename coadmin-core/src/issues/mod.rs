//! Issue reporting pipeline
//!
//! ```text
//! caller ─▶ ReportBuilder ──(ThrottleLedger)──▶ DeliverySink ─┬─▶ <folder>/<fingerprint>.issue
//!                                                              └─▶ DeliveryQueue ─▶ DeliveryWorker ─▶ collector
//! ```
//!
//! - [`ThrottleLedger`] admits each fingerprint at most once per interval
//! - [`ReportBuilder`] turns caller input into a [`crate::Report`]
//! - [`DeliverySink`] writes the report to disk or enqueues it
//! - [`DeliveryWorker`] drains the queue, one POST at a time, oldest first
//! - [`wait_until_empty`] lets a caller wait for the queue to drain
//!
//! [`Reporter`] wires these together.

mod flush;
mod queue;
mod report;
mod reporter;
mod sink;
mod throttle;
mod worker;

use std::path::PathBuf;

pub use flush::{wait_until_empty, wait_until_empty_async, FLUSH_POLL_INTERVAL};
pub use queue::DeliveryQueue;
pub use report::{fingerprint, host_meta, hostname, ReportBuilder};
pub use reporter::Reporter;
pub use sink::{issue_file_path, DeliverySink, ISSUE_FILE_EXTENSION};
pub use throttle::ThrottleLedger;
pub use worker::{CycleOutcome, DeliveryCounters, DeliveryStats, DeliveryWorker, WorkerHandle};

/// What happened to a reported issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Written to this issue file (file mode)
    Written(PathBuf),
    /// Queued for delivery (live mode); carries the fingerprint
    Queued(u32),
    /// Throttled: the same issue was reported within the minimum interval
    Suppressed,
}

impl Submission {
    /// True unless the issue was suppressed
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Submission::Suppressed)
    }
}
