use crate::catalog::SeedError;
use crate::config::ConfigError;
use crate::matching::MatchError;
use crate::response::failure;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;
use tracing::error;

/// Process-level failure surfaced by the binaries.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Seed(SeedError),
    Stats(MatchError),
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Seed(err) => write!(f, "seed error: {}", err),
            AppError::Stats(err) => write!(f, "school stats error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Seed(err) => Some(err),
            AppError::Stats(err) => Some(err),
            AppError::Export(err) => Some(&**err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Seed(err) => failure(StatusCode::BAD_REQUEST, &err.to_string()),
            AppError::Stats(err @ MatchError::MissingOccupationCode) => {
                failure(StatusCode::BAD_REQUEST, &err.to_string())
            }
            AppError::Stats(err @ MatchError::OccupationNotFound { .. }) => {
                failure(StatusCode::NOT_FOUND, &err.to_string())
            }
            other => {
                error!(error = %other, "request failed");
                failure(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<SeedError> for AppError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

impl From<MatchError> for AppError {
    fn from(value: MatchError) -> Self {
        Self::Stats(value)
    }
}
