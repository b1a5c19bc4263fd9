//! Structured telemetry initialisation for the plugin binary.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tbk_config::{LOG_FORMAT_ENV, LOG_LEVEL_ENV, LogFormat, LogSettings};
use tracing::{Subscriber, subscriber::SetGlobalDefaultError, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when telemetry has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Later calls return a fresh [`TelemetryHandle`] without touching the
/// global state. A filter that does not parse falls back to `info`, and an
/// unknown format falls back to compact output; both are reported as
/// warnings once the subscriber is running.
///
/// # Errors
///
/// Returns [`TelemetryError::Subscriber`] when another global subscriber
/// is already installed.
pub fn initialise(settings: &LogSettings) -> Result<TelemetryHandle, TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(settings))
        .map(|_| TelemetryHandle)
}

fn install_subscriber(settings: &LogSettings) -> Result<(), TelemetryError> {
    let (filter, rejected_filter) = match EnvFilter::try_new(settings.filter()) {
        Ok(filter) => (filter, None),
        Err(error) => (
            EnvFilter::new(LogSettings::default_filter()),
            Some(error.to_string()),
        ),
    };

    let builder = |filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            // Buildkite timestamps every job log line itself.
            .without_time()
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match settings.format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)?;

    if let Some(error) = rejected_filter {
        warn!(
            target: "tbk_plugin::telemetry",
            variable = LOG_LEVEL_ENV,
            filter = settings.filter(),
            %error,
            "invalid log filter, using default"
        );
    }
    if let Some(format) = settings.rejected_format() {
        warn!(
            target: "tbk_plugin::telemetry",
            variable = LOG_FORMAT_ENV,
            format,
            "unknown log format, using compact"
        );
    }
    Ok(())
}
