//! Diagnostic logging for resolution
//!
//! The coordinator and its providers report through a shared, replaceable
//! [`LogSink`]. The default sink forwards to `tracing`, so hosts only need
//! to install a subscriber (see [`init`]) to see resolution traces.

use std::fmt;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt as tracing_fmt, prelude::*};

/// Severity of a resolution trace message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Verbose,
    Debug,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Verbose => write!(f, "verbose"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Destination for trace messages emitted by the coordinator and providers.
pub type LogSink = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Sink that forwards every message to `tracing` under the `tweaks` target.
pub fn tracing_sink() -> LogSink {
    Arc::new(|level, message| match level {
        LogLevel::Verbose => tracing::trace!(target: "tweaks", "{}", message),
        LogLevel::Debug => tracing::debug!(target: "tweaks", "{}", message),
        LogLevel::Error => tracing::error!(target: "tweaks", "{}", message),
    })
}

/// Sink that discards everything.
pub fn silent_sink() -> LogSink {
    Arc::new(|_, _| {})
}

/// Initialize a tracing subscriber with default configuration.
///
/// Uses the `RUST_LOG` environment variable to determine the log level,
/// defaulting to "info" if not set. Set `RUST_LOG=tweaks=trace` to see
/// every lookup.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = tracing_fmt::layer()
        .with_target(true)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
