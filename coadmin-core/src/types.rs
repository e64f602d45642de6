//! Core domain types for coadmin
//!
//! | Term | Definition |
//! |------|------------|
//! | **Issue** | A caller-reported event with a severity [`Level`] and free-text description |
//! | **Fingerprint** | CRC-32 of `"{app}_issue_{level}_{description}"` (lower-cased); dedup key and file name |
//! | **Report** | The immutable record built for an admitted issue |
//!
//! The JSON shape of [`Report`] is a fixed wire format shared by issue files and
//! collector submissions, so field names are pinned with `#[serde(rename)]`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Wire format version written to `v`
pub const SCHEMA_VERSION: i32 = 5;

/// Placeholder for `caller` until call-site capture exists
pub const CALLER_PLACEHOLDER: &str = "not_implemented";

/// Placeholder for `libversion`
pub const LIB_VERSION_PLACEHOLDER: &str = "unknown";

/// Caller-supplied JSON context (`extra`) and delivery hints (`options`)
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Process-wide fixed metadata attached to every report
pub type Meta = BTreeMap<String, String>;

// ============================================
// Level
// ============================================

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Fatal,
    Error,
    Warning,
    Info,
    Debug,
}

impl Level {
    /// All recognized levels, most severe first
    pub const ALL: [Level; 5] = [
        Level::Fatal,
        Level::Error,
        Level::Warning,
        Level::Info,
        Level::Debug,
    ];

    /// Lower-case wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fatal => "fatal",
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Debug => "debug",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    /// Case-insensitive: `"Error"`, `"ERROR"` and `"error"` are the same level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Level::ALL
            .into_iter()
            .find(|level| level.as_str() == lowered)
            .ok_or_else(|| Error::InvalidLevel(s.to_string()))
    }
}

// ============================================
// Report
// ============================================

/// An issue report, immutable once built.
///
/// Produced by [`crate::issues::ReportBuilder`] only when the throttle ledger
/// admits its fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Wire format version
    #[serde(rename = "v")]
    pub version: i32,
    /// Fingerprint of (app, level, description)
    #[serde(rename = "issue_id")]
    pub fingerprint: u32,
    /// Process-wide metadata (hostname)
    pub meta: Meta,
    /// Delivery hints, passed through untouched
    pub options: Fields,
    /// Reserved
    pub caller: String,
    /// Reserved, always empty
    #[serde(rename = "stackTrace")]
    pub stack_trace: Vec<String>,
    /// Lower-cased application name
    pub app: String,
    /// Caller context
    pub extra: Fields,
    pub description: String,
    pub level: Level,
    /// Reserved
    #[serde(rename = "libversion")]
    pub lib_version: String,
    /// Creation time, milliseconds since the Unix epoch
    #[serde(rename = "t")]
    pub timestamp_millis: i64,
}

/// Body POSTed to the collector: `{"issue": <report>}`
#[derive(Debug, Serialize)]
pub struct IssueSubmission<'a> {
    pub issue: &'a Report,
}
