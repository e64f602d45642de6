//! # coadmin-core
//!
//! Core library for coadmin - client-side issue reporting.
//!
//! This library provides:
//! - Report building with per-issue throttling
//! - File persistence (`<folder>/<fingerprint>.issue`) or queued HTTP delivery
//! - A background delivery worker and a flush waiter
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use coadmin_core::{Config, Fields, Reporter};
//! use std::time::Duration;
//!
//! let config = Config::load().expect("failed to load config");
//! let reporter = Reporter::new("billing", config.reporter).expect("invalid reporter config");
//! reporter.start().expect("failed to start delivery worker");
//!
//! reporter
//!     .error("disk full", Fields::new(), Fields::new())
//!     .expect("failed to report issue");
//! reporter.wait_until_empty(Duration::from_secs(10));
//! ```

// Re-export commonly used items at the crate root
pub use config::{Config, ReporterConfig};
pub use error::{Error, Result};
pub use issues::{DeliveryStats, Reporter, Submission};
pub use types::*;

// Public modules
pub mod collector;
pub mod config;
pub mod error;
pub mod issues;
pub mod logging;
pub mod types;

#[cfg(test)]
mod test_support;
