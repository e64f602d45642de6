//! Shared fixtures for unit tests

use crate::types::{Fields, Level, Meta, Report, SCHEMA_VERSION};
use std::sync::{Arc, Mutex};

/// A minimal report with the given fingerprint
pub(crate) fn report(fingerprint: u32) -> Report {
    Report {
        version: SCHEMA_VERSION,
        fingerprint,
        meta: Meta::new(),
        options: Fields::new(),
        caller: String::new(),
        stack_trace: Vec::new(),
        app: "app".to_string(),
        extra: Fields::new(),
        description: format!("issue {}", fingerprint),
        level: Level::Info,
        lib_version: String::new(),
        timestamp_millis: 0,
    }
}

/// In-memory log sink for asserting on emitted events
#[derive(Clone, Default)]
pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// A debug-level subscriber writing into this buffer
    pub(crate) fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish()
    }

    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
