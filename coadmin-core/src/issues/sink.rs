//! Where admitted reports go
//!
//! File mode writes `<folder>/<fingerprint>.issue` synchronously; queue mode
//! appends to the delivery queue and returns before any network I/O.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::types::Report;

use super::queue::DeliveryQueue;
use super::Submission;

/// Extension of persisted issue files
pub const ISSUE_FILE_EXTENSION: &str = "issue";

/// Path of the issue file for `fingerprint` inside `folder`
pub fn issue_file_path(folder: &Path, fingerprint: u32) -> PathBuf {
    folder.join(format!("{}.{}", fingerprint, ISSUE_FILE_EXTENSION))
}

/// Delivery backend; the two modes are mutually exclusive.
#[derive(Debug, Clone)]
pub enum DeliverySink {
    /// Write each report to its own file
    File { folder: PathBuf },
    /// Hand reports to the background worker
    Queue(Arc<DeliveryQueue>),
}

impl DeliverySink {
    /// Submit a report.
    ///
    /// File mode surfaces serialization and write failures; queue mode never fails.
    /// The folder is not created: a missing directory is a write failure.
    pub fn submit(&self, report: Report) -> Result<Submission> {
        match self {
            DeliverySink::File { folder } => {
                let path = issue_file_path(folder, report.fingerprint);
                let data = serde_json::to_vec(&report)?;
                std::fs::write(&path, data).map_err(|e| {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to write issue file");
                    e
                })?;
                tracing::debug!(fingerprint = report.fingerprint, path = %path.display(), "Issue written");
                Ok(Submission::Written(path))
            }
            DeliverySink::Queue(queue) => {
                let fingerprint = report.fingerprint;
                let pending = queue.push(report);
                tracing::debug!(fingerprint, pending, "Issue queued for delivery");
                Ok(Submission::Queued(fingerprint))
            }
        }
    }
}
