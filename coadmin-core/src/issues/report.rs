//! Report construction
//!
//! Turns caller input into an immutable [`Report`], consulting the throttle
//! ledger first. Pure computation: no disk or network I/O happens here.

use chrono::{DateTime, Utc};
use std::ffi::OsString;

use crate::types::{
    Fields, Level, Meta, Report, CALLER_PLACEHOLDER, LIB_VERSION_PLACEHOLDER, SCHEMA_VERSION,
};

use super::throttle::ThrottleLedger;

/// Compute the fingerprint of an issue.
///
/// CRC-32 (IEEE) over the lower-cased `"{app}_issue_{level}_{description}"`,
/// so `("App", Error, "X")` and `("app", Error, "x")` collide on purpose.
pub fn fingerprint(app: &str, level: Level, description: &str) -> u32 {
    let input = format!("{}_issue_{}_{}", app, level, description).to_lowercase();
    crc32fast::hash(input.as_bytes())
}

/// Machine name as reported by the OS.
///
/// Falls back to `HOSTNAME`/`COMPUTERNAME`, then `"unknown"`, only when the OS
/// gives back nothing usable.
pub fn hostname() -> String {
    pick_hostname(gethostname::gethostname(), || {
        std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .ok()
    })
}

fn pick_hostname(os: OsString, fallback: impl FnOnce() -> Option<String>) -> String {
    os.into_string()
        .ok()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .or_else(|| fallback().filter(|name| !name.trim().is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Fixed metadata attached to every report of this process
pub fn host_meta() -> Meta {
    let mut meta = Meta::new();
    meta.insert("hostname".to_string(), hostname());
    meta
}

/// Builds reports for admitted issues.
#[derive(Debug)]
pub struct ReportBuilder {
    ledger: ThrottleLedger,
    meta: Meta,
    verbose: bool,
}

impl ReportBuilder {
    pub fn new(ledger: ThrottleLedger, meta: Meta) -> Self {
        Self {
            ledger,
            meta,
            verbose: false,
        }
    }

    /// Log every built report at debug level
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Build a report, or `None` if the fingerprint is throttled at `now`.
    pub fn build(
        &self,
        app: &str,
        level: Level,
        description: &str,
        extra: Fields,
        options: Fields,
        now: DateTime<Utc>,
    ) -> Option<Report> {
        let app = app.to_lowercase();
        let fingerprint = fingerprint(&app, level, description);

        if !self.ledger.try_admit(fingerprint, now) {
            tracing::debug!(
                fingerprint,
                app = %app,
                level = %level,
                "Issue reported too recently; suppressed"
            );
            return None;
        }

        let report = Report {
            version: SCHEMA_VERSION,
            fingerprint,
            meta: self.meta.clone(),
            options,
            caller: CALLER_PLACEHOLDER.to_string(),
            stack_trace: Vec::new(),
            app,
            extra,
            description: description.to_string(),
            level,
            lib_version: LIB_VERSION_PLACEHOLDER.to_string(),
            timestamp_millis: now.timestamp_millis(),
        };

        if self.verbose {
            tracing::debug!(fingerprint, report = ?report, "Built report");
        }

        Some(report)
    }
}
