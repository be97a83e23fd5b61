//! # ragchat-telemetry
//!
//! Process-wide `tracing` setup for ragchat binaries.
//!
//! The filter comes from `RUST_LOG` (default `info`). Setting
//! `RAGCHAT_LOG_FORMAT=json` switches the output to one JSON object per line.
//!
//! ```rust,ignore
//! ragchat_telemetry::init_telemetry("ragchat-cli")?;
//! tracing::info!(corpus = %path.display(), "starting");
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed.
pub type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "RAGCHAT_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event.
    #[default]
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl LogFormat {
    /// Read the format from [`LOG_FORMAT_ENV`], falling back to [`LogFormat::Pretty`]
    /// when unset or unrecognized.
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV).ok().and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

/// Install the global subscriber using [`LogFormat::from_env`].
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn init_telemetry(service_name: &str) -> Result<(), InitError> {
    init_with_format(service_name, LogFormat::from_env())
}

/// Install the global subscriber with an explicit format.
pub fn init_with_format(service_name: &str, format: LogFormat) -> Result<(), InitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    match format {
        LogFormat::Pretty => builder.with_target(false).try_init()?,
        LogFormat::Json => builder.json().with_current_span(true).try_init()?,
    }

    tracing::debug!(service = service_name, ?format, "telemetry initialized");
    Ok(())
}
