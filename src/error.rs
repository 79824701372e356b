/// Error returned by a [`LogSink`](crate::sink::LogSink) that failed to
/// accept a line.
#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("log sink write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("log sink is closed")]
    Closed,
}

/// Error returned when the process configuration cannot be built.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {source}")]
    InvalidPort {
        key: &'static str,
        value: String,
        source: std::num::ParseIntError,
    },
}
