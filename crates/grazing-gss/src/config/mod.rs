use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::plots::Indicator;
use crate::workflows::scoring::ScoringConfig;

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
    pub sessions: SessionConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("GSS_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("GSS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("GSS_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("GSS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let max_sessions = match env::var("GSS_MAX_SESSIONS") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(ConfigError::InvalidSessionLimit)?,
            Err(_) => SessionConfig::DEFAULT_MAX_SESSIONS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            sessions: SessionConfig { max_sessions },
            scoring: load_scoring()?,
        })
    }
}

fn weight_var(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Biomass => "GSS_WEIGHT_BIOMASS",
        Indicator::ShrubCover => "GSS_WEIGHT_SHRUB",
        Indicator::GrazingPressure => "GSS_WEIGHT_GRAZING",
        Indicator::WoodyCount => "GSS_WEIGHT_WOODY",
    }
}

fn load_scoring() -> Result<ScoringConfig, ConfigError> {
    let invert = match env::var("GSS_INVERT_PRESSURES") {
        Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
            var: "GSS_INVERT_PRESSURES",
        })?,
        Err(_) => false,
    };

    let mut scoring = if invert {
        ScoringConfig::inverted_pressures()
    } else {
        ScoringConfig::default()
    };

    for indicator in Indicator::ALL {
        let var = weight_var(indicator);
        if let Ok(raw) = env::var(var) {
            let weight = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|weight| weight.is_finite() && *weight >= 0.0)
                .ok_or(ConfigError::InvalidWeight { var })?;
            scoring.set_weight(indicator, weight);
        }
    }

    scoring
        .normalized()
        .map_err(|_| ConfigError::InvalidWeight {
            var: "GSS_WEIGHT_*",
        })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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

/// Bounds on the in-memory session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_sessions: usize,
}

impl SessionConfig {
    pub const DEFAULT_MAX_SESSIONS: usize = 64;
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSessionLimit,
    InvalidWeight { var: &'static str },
    InvalidFlag { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "GSS_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "GSS_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSessionLimit => {
                write!(f, "GSS_MAX_SESSIONS must be a positive integer")
            }
            ConfigError::InvalidWeight { var } => write!(
                f,
                "{var} must be a finite, non-negative number and at least one weight must be positive"
            ),
            ConfigError::InvalidFlag { var } => {
                write!(f, "{var} must be one of true/false, yes/no, on/off or 1/0")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSessionLimit
            | ConfigError::InvalidWeight { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
