use crate::error::SinkError;
use crate::sink::LogSink;

/// A sink that simply drops all lines.
///
/// Useful for exercising the handler without any output, e.g. when only
/// the HTTP response matters.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn write_line(&self, _line: &str) -> Result<(), SinkError> {
        Ok(())
    }
}
