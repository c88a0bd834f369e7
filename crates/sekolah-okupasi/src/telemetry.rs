use crate::config::{LogFormat, TelemetryConfig};
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `APP_LOG_LEVEL`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(config)?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(config.ansi);

    match config.format {
        LogFormat::Compact => builder.with_target(false).compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    }
    .map_err(TelemetryError::Subscriber)
}

fn configured_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::EnvFilter {
        value: config.log_level.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(log_level: &str) -> TelemetryConfig {
        TelemetryConfig {
            log_level: log_level.to_string(),
            format: LogFormat::Compact,
            ansi: false,
        }
    }

    #[test]
    fn accepts_per_module_directives() {
        assert!(configured_filter(&config("info,sekolah_okupasi::matching=debug")).is_ok());
    }

    #[test]
    fn rejects_malformed_directives() {
        let err = configured_filter(&config("sekolah_okupasi=loud")).expect_err("invalid level");
        assert!(err.to_string().contains("sekolah_okupasi=loud"));
    }
}
