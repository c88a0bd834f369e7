use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::catalog::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw).ok_or(ConfigError::InvalidLogFormat(raw))?,
            Err(_) => LogFormat::Compact,
        };

        let seed_path = env::var("APP_SEED_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let page_size = match env::var("APP_PAGE_SIZE") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
                .ok_or(ConfigError::InvalidPageSize)?,
            Err(_) => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
                ansi: environment == AppEnvironment::Development,
            },
            catalog: CatalogConfig {
                seed_path,
                page_size,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
    /// Colored output, only wanted on a developer terminal.
    pub ansi: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Some(Self::Compact),
            "pretty" => Some(Self::Pretty),
            _ => None,
        }
    }
}

/// Catalog bootstrap and listing defaults.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// JSON snapshot loaded into the in-memory store at startup.
    pub seed_path: Option<PathBuf>,
    pub page_size: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidPageSize,
    InvalidLogFormat(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidPageSize => {
                write!(f, "APP_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'pretty', got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidPageSize
            | ConfigError::InvalidLogFormat(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
