use crate::error::SinkError;
use std::io::Write;

/// Destination for rendered log lines.
///
/// The handler and the tracing layer hand over one already-encoded line per
/// call; the sink appends the trailing newline. Implementations must be
/// safe to share between request tasks.
pub trait LogSink: Send + Sync {
    /// Append `line` followed by a single `\n`.
    ///
    /// **Returns**
    /// - `Ok(())` if the line was written.
    /// - `Err(..)` if the destination rejected it. Callers treat this as
    ///   a diagnostic, never as a request failure.
    fn write_line(&self, line: &str) -> Result<(), SinkError>;
}

/// Writes each line to the process stdout, where the Cloud Run logging
/// agent picks it up.
///
/// The line and its newline go out in one `write_all` under the stdout
/// lock so concurrent requests never interleave inside a line.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, line: &str) -> Result<(), SinkError> {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        let mut out = std::io::stdout().lock();
        out.write_all(&buf)?;
        out.flush()?;
        Ok(())
    }
}
