use crate::record::{LogEntry, Severity, SourceLocation};
use crate::sink::LogSink;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns events into [`LogEntry`] lines
/// and writes them straight to a [`LogSink`].
///
/// Events more verbose than `max_level` are ignored. There is no queue:
/// each event is encoded and written on the thread that emitted it, the
/// same way the request handler writes its entries.
pub struct EntryLayer {
    sink: Arc<dyn LogSink>,
    max_level: Level,
    /// Total events seen by the layer (before filtering by level).
    pub total_events: Arc<AtomicU64>,
    /// Lines accepted by the sink.
    pub written_events: Arc<AtomicU64>,
    /// Events that could not be encoded or written.
    pub failed_events: Arc<AtomicU64>,
}

impl EntryLayer {
    pub fn new(sink: Arc<dyn LogSink>, max_level: Level) -> Self {
        Self {
            sink,
            max_level,
            total_events: Arc::new(AtomicU64::new(0)),
            written_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Build the entry for one event.
fn entry_from_event(event: &Event<'_>) -> LogEntry {
    let mut labels = BTreeMap::new();
    let mut message: Option<String> = None;

    let mut visitor = FieldVisitor { fields: &mut labels, message: &mut message };
    event.record(&mut visitor);

    let meta = event.metadata();
    LogEntry {
        severity: Severity::from(meta.level()).to_string(),
        message: message.unwrap_or_default(),
        timestamp: Utc::now(),
        labels,
        source_location: SourceLocation {
            file: meta.file().unwrap_or_default().to_string(),
            line: meta.line().map(|l| l.to_string()).unwrap_or_default(),
            function: meta.module_path().unwrap_or(meta.target()).to_string(),
        },
        ..Default::default()
    }
}

impl<S> Layer<S> for EntryLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);
        if *event.metadata().level() > self.max_level {
            return;
        }

        // Encoding failures go to stderr: reporting them through `tracing`
        // would re-enter this layer.
        let entry = entry_from_event(event);
        let line = match crate::encode::try_encode(&entry) {
            Ok(line) => line,
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("failed to encode tracing event: {}", e);
                return;
            }
        };

        match self.sink.write_line(&line) {
            Ok(()) => {
                self.written_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("failed to write tracing event: {}", e);
            }
        }
    }
}

/// Collects event fields into entry labels; the `message` field becomes
/// the entry message.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::memory_sink::MemorySink;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn capture(max_level: Level, f: impl FnOnce()) -> (Vec<serde_json::Value>, u64) {
        let sink = MemorySink::new();
        let layer = EntryLayer::new(Arc::new(sink.clone()), max_level);
        let total = Arc::clone(&layer.total_events);
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        let entries = sink
            .lines()
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (entries, total.load(Ordering::Relaxed))
    }

    #[test]
    fn event_becomes_structured_entry() {
        let (entries, _) = capture(Level::INFO, || {
            tracing::warn!(port = 8080u64, ready = false, "Listening on port {}", 8080);
        });
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry["severity"], "WARNING");
        assert_eq!(entry["message"], "Listening on port 8080");
        assert_eq!(entry["logging.googleapis.com/labels"]["port"], 8080);
        assert_eq!(entry["logging.googleapis.com/labels"]["ready"], false);
        let location = &entry["logging.googleapis.com/sourceLocation"];
        assert!(location["file"].as_str().unwrap().ends_with("layer.rs"));
        assert!(!location["line"].as_str().unwrap().is_empty());
        assert!(location["function"].as_str().unwrap().contains("layer"));
    }

    struct RejectingSink;

    impl LogSink for RejectingSink {
        fn write_line(&self, _line: &str) -> Result<(), SinkError> {
            Err(SinkError::Closed)
        }
    }

    fn counters(layer: &EntryLayer) -> (Arc<AtomicU64>, Arc<AtomicU64>) {
        (Arc::clone(&layer.written_events), Arc::clone(&layer.failed_events))
    }

    #[test]
    fn sink_failure_is_counted_not_propagated() {
        let layer = EntryLayer::new(Arc::new(RejectingSink), Level::INFO);
        let (written, failed) = counters(&layer);
        tracing::subscriber::with_default(Registry::default().with(layer), || {
            tracing::error!("dropped");
        });
        assert_eq!(failed.load(Ordering::Relaxed), 1);
        assert_eq!(written.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn written_events_match_sink_lines() {
        let sink = MemorySink::new();
        let layer = EntryLayer::new(Arc::new(sink.clone()), Level::INFO);
        let (written, failed) = counters(&layer);
        tracing::subscriber::with_default(Registry::default().with(layer), || {
            tracing::info!("one");
            tracing::warn!("two");
            tracing::trace!("skipped");
        });
        assert_eq!(written.load(Ordering::Relaxed), sink.lines().len() as u64);
        assert_eq!(written.load(Ordering::Relaxed), 2);
        assert_eq!(failed.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn events_above_max_level_are_skipped() {
        let (entries, total) = capture(Level::INFO, || {
            tracing::debug!("noise");
            tracing::error!("kept");
        });
        assert_eq!(total, 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["severity"], "ERROR");
        assert_eq!(entries[0]["message"], "kept");
    }
}
