use crate::error::SinkError;
use crate::sink::LogSink;
use std::sync::{Arc, Mutex};

/// Sink that keeps every line in memory.
///
/// Clones share the same buffer, so a test can hand one clone to the
/// router and read the output back through another.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far, without their newlines.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Everything written so far exactly as it would appear on stdout.
    pub fn contents(&self) -> String {
        self.lines()
            .into_iter()
            .map(|l| l + "\n")
            .collect()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut lines = self.lines.lock().map_err(|_| SinkError::Closed)?;
        lines.push(line.to_string());
        Ok(())
    }
}
