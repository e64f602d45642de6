//! Issue collector client
//!
//! Live-mode reporters hand reports to a background worker, which submits
//! them one at a time to the collector configured in `reporter.server`:
//!
//! ```toml
//! [reporter]
//! live = true
//! server = "https://issues.example.com/api"
//! request_timeout_secs = 10
//! ```
//!
//! Network failures never block the reporting caller.

mod client;

pub use client::CollectorClient;
