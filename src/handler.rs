use crate::record::{HttpRequest, LogEntry, Severity, SourceLocation};
use crate::sink::LogSink;
use axum::extract::State;
use axum::routing::any;
use axum::Router;
use chrono::{TimeZone, Timelike, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Body returned for every request to `/`.
pub const GREETING: &str = "Hello Logger!\n";

/// Shared state handed to the request handler.
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn LogSink>,
}

impl AppState {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }
}

/// Build the router serving `/` for any method.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(index_handler))
        .with_state(state)
}

/// Write one demonstration entry to the sink and greet the caller.
///
/// Neither an encoding failure nor a sink failure reaches the response.
pub async fn index_handler(State(state): State<AppState>) -> &'static str {
    let line = example_entry().to_line();
    if let Err(e) = state.sink.write_line(&line) {
        warn!(error = %e, "failed to write log entry");
    }
    GREETING
}

/// The fixed entry emitted for each request, with every field populated.
pub fn example_entry() -> LogEntry {
    let timestamp = Utc
        .with_ymd_and_hms(2020, 10, 16, 21, 22, 23)
        .single()
        .and_then(|t| t.with_nanosecond(24))
        .unwrap_or_default();

    let mut labels = BTreeMap::new();
    labels.insert("key1".to_string(), serde_json::Value::from("value"));
    labels.insert("key2".to_string(), serde_json::Value::from("42"));

    LogEntry {
        severity: Severity::Notice.to_string(),
        message: "This is the default display field.".to_string(),
        http_request: HttpRequest {
            request_method: "POST".to_string(),
            request_url: "https://myapi.com".to_string(),
            request_size: "1234".to_string(),
            status: 200,
            response_size: "5678".to_string(),
            user_agent: "UserAgent".to_string(),
            remote_ip: "192.168.1.1".to_string(),
            server_ip: "192.168.1.1".to_string(),
            referer: "https://referer.com".to_string(),
            latency: "3.5s".to_string(),
            cache_lookup: true,
            cache_hit: true,
            cache_validated_with_origin_server: true,
            cache_fill_bytes: "31415".to_string(),
            protocol: "HTTP/2".to_string(),
        },
        timestamp,
        insert_id: "123456".to_string(),
        labels,
        operation: "operation".to_string(),
        source_location: SourceLocation {
            file: "main.go".to_string(),
            line: "132".to_string(),
            function: "indexHandler".to_string(),
        },
        span_id: "000000000000004a".to_string(),
        trace: "projects/my-projectid/traces/06796866738c859f2f19b7cfb3214824".to_string(),
        trace_sampled: true,
    }
}
