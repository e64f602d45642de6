//! HTTP client for the issue collector
//!
//! Each report is POSTed on its own as `{"issue": <report>}` with a JSON
//! content type. There is no retry here: a failed submission is the worker's
//! to log and discard.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

use crate::config::ReporterConfig;
use crate::error::{Error, Result};
use crate::types::{IssueSubmission, Report};

/// HTTP client for the collector endpoint
#[derive(Debug, Clone)]
pub struct CollectorClient {
    http_client: reqwest::Client,
    server: String,
}

impl CollectorClient {
    /// Create a new collector client from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: &ReporterConfig) -> Result<Self> {
        config.validate()?;

        if config.server.trim().is_empty() {
            return Err(Error::Config("reporter.server is required".to_string()));
        }

        // Build default headers
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            server: config.server.clone(),
        })
    }

    /// Submit one report.
    ///
    /// Returns the response status on 2xx; transport failures and any other
    /// status come back as [`Error::Collector`].
    pub async fn send_issue(&self, report: &Report) -> Result<reqwest::StatusCode> {
        let response = self
            .http_client
            .post(&self.server)
            .json(&IssueSubmission { issue: report })
            .send()
            .await
            .map_err(|e| Error::Collector(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status.is_success() {
            Ok(status)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Collector(format!(
                "API error ({}): {}",
                status, error_text
            )))
        }
    }

    /// Collector endpoint
    pub fn server(&self) -> &str {
        &self.server
    }
}
