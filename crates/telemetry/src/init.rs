//! One-shot `tracing` subscriber setup, grounded on the teacher's
//! `ioi_telemetry::init` (`tracing_subscriber::fmt` + `env-filter`, called
//! once at process start). Guarded by a `OnceCell` so a worker and a test
//! harness can both call [`init_tracing`] without panicking on the second
//! `tracing::subscriber::set_global_default` call the crate underneath
//! only tolerates once.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: OnceCell<()> = OnceCell::new();

/// Plain human-readable lines, or one-JSON-object-per-line for ingestion
/// by a log pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    /// An `EnvFilter` directive string, e.g. `"settld=info,warn"`. Falls
    /// back to `"info"` if empty or invalid.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Installs the global `tracing` subscriber. Safe to call more than once —
/// every call after the first is a no-op, so callers don't need to
/// coordinate who calls it first.
pub fn init_tracing(config: &LogConfig) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("info"));
        let result = match config.format {
            LogFormat::Pretty => fmt().with_env_filter(filter).try_init(),
            LogFormat::Json => fmt().with_env_filter(filter).json().try_init(),
        };
        if let Err(err) = result {
            // A subscriber was already installed by something other than
            // this function (e.g. a test harness); that's fine, not fatal.
            eprintln!("settld-telemetry: tracing subscriber already set: {err}");
        }
    });
}
