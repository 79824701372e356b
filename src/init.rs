use crate::env::{env_or, is_truthy, LOG_STDERR_ENV};
use crate::layer::EntryLayer;
use crate::sink::LogSink;
use std::sync::Arc;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the diagnostics subscriber.
///
/// **Fields**
/// - `max_level`: most verbose level turned into structured entries.
/// - `enable_stderr`: if `true`, a `tracing_subscriber::fmt::Layer`
///   writing to stderr is added next to [`EntryLayer`], so diagnostics stay
///   readable in a local terminal.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub max_level: Level,
    pub enable_stderr: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            max_level: Level::INFO,
            enable_stderr: false,
        }
    }
}

impl LayerConfig {
    /// Defaults, with `enable_stderr` taken from [`LOG_STDERR_ENV`].
    pub fn from_env() -> Self {
        Self {
            enable_stderr: is_truthy(&env_or(LOG_STDERR_ENV, "false")),
            ..Self::default()
        }
    }
}

/// Build the diagnostics subscriber without installing it.
///
/// [`EntryLayer`] always writes to `sink`; the stderr `fmt` layer is
/// present only when `config.enable_stderr` is set.
pub fn build_subscriber(sink: Arc<dyn LogSink>, config: LayerConfig) -> impl Subscriber + Send + Sync {
    let layer = EntryLayer::new(sink, config.max_level);
    let fmt_layer = config
        .enable_stderr
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    Registry::default().with(layer).with(fmt_layer)
}

/// Initialize the global `tracing` subscriber.
///
/// **Parameters**
/// - `sink`: [`LogSink`] receiving one structured line per event.
/// - `config`: [`LayerConfig`] controlling level and stderr mirroring.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(
    sink: Arc<dyn LogSink>,
    config: LayerConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(build_subscriber(sink, config))
}

/// Initialize tracing with [`LayerConfig::from_env`].
pub fn init_tracing(sink: Arc<dyn LogSink>) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    init_tracing_with_config(sink, LayerConfig::from_env())
}
