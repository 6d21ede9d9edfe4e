//! Environment-driven configuration. Everything the binary can tune lives
//! here: the HTTP binding, log level, the scoring tie-break policy, and the
//! reporting defaults applied when a request leaves them out.

use crate::assessments::scoring::{MoralTieBreak, ScoringConfig};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_TREND_MONTHS: u32 = 6;
const DEFAULT_RANKING_LIMIT: usize = 10;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
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
    pub scoring: ScoringConfig,
    pub reporting: ReportingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    fn from_env() -> Result<Self, ConfigError> {
        let environment = AppEnvironment::parse(&var_or("PULSE_ENV", "development"));

        let server = ServerConfig {
            host: var_or("PULSE_HOST", DEFAULT_HOST),
            port: parse_var("PULSE_PORT", DEFAULT_PORT, "a port number (u16)", |raw| {
                raw.parse().ok()
            })?,
        };

        let telemetry = TelemetryConfig {
            log_level: var_or("PULSE_LOG_LEVEL", DEFAULT_LOG_LEVEL),
        };

        let mut scoring = ScoringConfig::standard_integrity();
        scoring.moral_tie_break = parse_var(
            "PULSE_MORAL_TIE_BREAK",
            scoring.moral_tie_break,
            "one of: higher_stage, lower_stage",
            parse_tie_break,
        )?;

        let reporting = ReportingConfig {
            trend_months: parse_var(
                "PULSE_TREND_MONTHS",
                DEFAULT_TREND_MONTHS,
                "a month count of at least 1",
                |raw| raw.parse().ok().filter(|months| *months >= 1),
            )?,
            ranking_limit: parse_var(
                "PULSE_RANKING_LIMIT",
                DEFAULT_RANKING_LIMIT,
                "an entry count of at least 1",
                |raw| raw.parse().ok().filter(|limit| *limit >= 1),
            )?,
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            scoring,
            reporting,
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
        // "localhost" is accepted as a convenience; anything else must be a
        // literal IP address.
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self.host.parse().map_err(|source| ConfigError::BadHost {
            raw: self.host.clone(),
            source,
        })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Defaults applied to roll-up report requests that omit a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingConfig {
    /// Look-back for the monthly trend, in calendar months.
    pub trend_months: u32,
    /// Entries kept in the department ranking.
    pub ranking_limit: usize,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            trend_months: DEFAULT_TREND_MONTHS,
            ranking_limit: DEFAULT_RANKING_LIMIT,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// An environment variable was set to something unusable.
    BadValue {
        key: &'static str,
        raw: String,
        expected: &'static str,
    },
    BadHost {
        raw: String,
        source: std::net::AddrParseError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BadValue { key, raw, expected } => {
                write!(f, "{key}: expected {expected}, got '{raw}'")
            }
            ConfigError::BadHost { raw, .. } => {
                write!(f, "PULSE_HOST: '{raw}' is not an IP address or 'localhost'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::BadValue { .. } => None,
            ConfigError::BadHost { source, .. } => Some(source),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(
    key: &'static str,
    default: T,
    expected: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => parse(raw.trim()).ok_or(ConfigError::BadValue { key, raw, expected }),
    }
}

fn parse_tie_break(raw: &str) -> Option<MoralTieBreak> {
    match raw.to_ascii_lowercase().as_str() {
        "higher" | "higher_stage" => Some(MoralTieBreak::PreferHigherStage),
        "lower" | "lower_stage" => Some(MoralTieBreak::PreferLowerStage),
        _ => None,
    }
}
