use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Severity written when an entry leaves its severity blank.
pub const DEFAULT_SEVERITY: &str = "INFO";

/// One structured log entry in the shape Cloud Logging parses from stdout.
///
/// Field names on the wire are fixed by the ingestion backend; the
/// `logging.googleapis.com/*` keys are lifted into the `LogEntry` itself
/// instead of landing in `jsonPayload`. Every field is always emitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogEntry {
    #[serde(serialize_with = "severity_or_default")]
    pub severity: String,
    pub message: String,
    #[serde(rename = "httpRequest")]
    pub http_request: HttpRequest,
    #[serde(rename = "time", serialize_with = "rfc3339_nanos")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "logging.googleapis.com/insertId")]
    pub insert_id: String,
    #[serde(rename = "logging.googleapis.com/labels")]
    pub labels: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "logging.googleapis.com/operation")]
    pub operation: String,
    #[serde(rename = "logging.googleapis.com/sourceLocation")]
    pub source_location: SourceLocation,
    #[serde(rename = "logging.googleapis.com/spanId")]
    pub span_id: String,
    #[serde(rename = "logging.googleapis.com/trace")]
    pub trace: String,
    #[serde(rename = "logging.googleapis.com/trace_sampled")]
    pub trace_sampled: bool,
}

/// HTTP transaction associated with a [`LogEntry`].
///
/// Byte counts are strings so consumers parsing JSON numbers as doubles
/// don't lose precision on large values.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub request_method: String,
    pub request_url: String,
    pub request_size: String,
    pub status: i32,
    pub response_size: String,
    pub user_agent: String,
    pub remote_ip: String,
    pub server_ip: String,
    pub referer: String,
    pub latency: String,
    pub cache_lookup: bool,
    pub cache_hit: bool,
    pub cache_validated_with_origin_server: bool,
    pub cache_fill_bytes: String,
    pub protocol: String,
}

/// Code location that produced an entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: String,
    pub function: String,
}

impl LogEntry {
    /// Render the entry as a single JSON line (without the trailing newline).
    ///
    /// Returns an empty string if the entry cannot be encoded; the failure
    /// is reported through `tracing` instead of being propagated.
    pub fn to_line(&self) -> String {
        crate::encode::encode_line(self)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_line())
    }
}

/// Severity levels understood by Cloud Logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Default,
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Default => "DEFAULT",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::INFO => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

fn severity_or_default<S: Serializer>(severity: &str, serializer: S) -> Result<S::Ok, S::Error> {
    if severity.is_empty() {
        serializer.serialize_str(DEFAULT_SEVERITY)
    } else {
        serializer.serialize_str(severity)
    }
}

fn rfc3339_nanos<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Nanos, true))
}
