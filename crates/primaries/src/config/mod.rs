use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::determination::catalog::{OverlapPolicy, ParseOverlapPolicyError};

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
    pub engine: EngineConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig::from_env()?,
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
}

/// Catalog source and date reference for the determination engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// JSON catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
    /// Year treated as "now"; later diagnosis years count as unknown. Defaults to today.
    pub reference_year: Option<i32>,
    pub overlap_policy: OverlapPolicy,
}

impl EngineConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let catalog_path = env::var("MP_CATALOG_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let reference_year = match env::var("MP_REFERENCE_YEAR") {
            Ok(value) if !value.trim().is_empty() => Some(
                value
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| ConfigError::InvalidReferenceYear(value.clone()))?,
            ),
            _ => None,
        };

        let overlap_policy = match env::var("MP_CATALOG_OVERLAP") {
            Ok(value) if !value.trim().is_empty() => value
                .parse()
                .map_err(|source| ConfigError::InvalidOverlapPolicy { source })?,
            _ => OverlapPolicy::default(),
        };

        Ok(Self {
            catalog_path,
            reference_year,
            overlap_policy,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidReferenceYear(String),
    InvalidOverlapPolicy { source: ParseOverlapPolicyError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidReferenceYear(value) => {
                write!(f, "MP_REFERENCE_YEAR must be a year, got '{}'", value)
            }
            ConfigError::InvalidOverlapPolicy { .. } => {
                write!(f, "MP_CATALOG_OVERLAP must be one of allow, warn or reject")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidReferenceYear(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidOverlapPolicy { source } => Some(source),
        }
    }
}
