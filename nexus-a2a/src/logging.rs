//! Logging setup for applications embedding the transport.
//!
//! The library itself only emits `tracing` events and spans. Applications
//! that do not install their own subscriber can call [`init_logging`].

use tracing_subscriber::EnvFilter;

use crate::errors::LoggingError;

/// Setting this variable to `1` or `true` turns [`init_logging`] into a no-op.
pub const DISABLE_LOGGING_ENV: &str = "NEXUS_A2A_DISABLE_LOGGING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_level: String,
    pub enable_console: bool,
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            enable_console: true,
            enabled: true,
        }
    }
}

impl LoggingConfig {
    /// Default configuration, disabled when [`DISABLE_LOGGING_ENV`] is set.
    pub fn from_env() -> Self {
        let disabled = std::env::var(DISABLE_LOGGING_ENV)
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        Self {
            enabled: !disabled,
            ..Self::default()
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_console(mut self, enabled: bool) -> Self {
        self.enable_console = enabled;
        self
    }
}

/// Install a global subscriber: an env filter plus a compact console layer.
///
/// Returns [`LoggingError::AlreadyInitialized`] when another subscriber is
/// already installed, so callers can carry on without logging.
///
/// ```rust,no_run
/// use nexus_a2a::logging::{init_logging, LoggingConfig};
///
/// if let Err(e) = init_logging(LoggingConfig::from_env()) {
///     eprintln!("continuing without logging: {e}");
/// }
/// ```
pub fn init_logging(config: LoggingConfig) -> Result<(), LoggingError> {
    if !config.enabled {
        return Err(LoggingError::Disabled);
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let fmt_layer = if config.enable_console {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .compact(),
        )
    } else {
        None
    };

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}
