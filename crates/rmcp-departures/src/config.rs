use std::{net::SocketAddr, time::Duration};

use chrono_tz::Tz;
use thiserror::Error;

pub const DEFAULT_MONITORING_URL: &str =
    "https://prim.iledefrance-mobilites.fr/marketplace/stop-monitoring?MonitoringRef=STIF:StopArea:SP:xxxxxx:";
pub const DEFAULT_DESTINATION_REF: &str = "STIF:StopArea:SP:yyyyy:";
pub const DEFAULT_ORIGIN_NAME: &str = "Les Vallées";
pub const DEFAULT_DESTINATION_NAME: &str = "Saint Lazare";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_BIND_PORT: u16 = 8000;

/// Where to ask for predictions and which destination to keep.
///
/// Built once at startup; tool callers never get to change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitoringRequest {
    pub endpoint: String,
    pub api_key: String,
    pub destination_ref: String,
}

/// How the MCP server is exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    /// Streamable HTTP on `Config::bind_socket`, for clients such as Home Assistant.
    Http,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub request: MonitoringRequest,
    pub origin_name: String,
    pub destination_name: String,
    pub timezone: Tz,
    pub timeout: Duration,
    pub transport: Transport,
    pub bind_socket: SocketAddr,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IDF_API_KEY is required and must not be empty")]
    MissingApiKey,
    #[error("IDF_MONITORING_URL must be an http(s) URL, got '{0}'")]
    InvalidMonitoringUrl(String),
    #[error("IDF_DESTINATION_REF must not be empty")]
    MissingDestinationRef,
    #[error("IDF_TIMEZONE must be an IANA timezone name, got '{0}'")]
    InvalidTimezone(String),
    #[error("IDF_HTTP_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),
    #[error("IDF_TRANSPORT must be 'stdio' or 'http', got '{0}'")]
    InvalidTransport(String),
    #[error("IDF_BIND_PORT must be a valid u16, got '{0}'")]
    InvalidPort(String),
    #[error("invalid bind address or port: {0}")]
    InvalidSocket(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = var("IDF_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let endpoint = var("IDF_MONITORING_URL").unwrap_or_else(|| DEFAULT_MONITORING_URL.to_string());
        match reqwest::Url::parse(&endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidMonitoringUrl(endpoint)),
        }

        let destination_ref = match lookup("IDF_DESTINATION_REF") {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::MissingDestinationRef),
            Some(value) => value.trim().to_string(),
            None => DEFAULT_DESTINATION_REF.to_string(),
        };

        let timezone = var("IDF_TIMEZONE")
            .map(|name| name.parse::<Tz>().map_err(|_| ConfigError::InvalidTimezone(name)))
            .transpose()?
            .unwrap_or(chrono_tz::Europe::Paris);

        let timeout = var("IDF_HTTP_TIMEOUT_SECS")
            .map(|value| match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
                _ => Err(ConfigError::InvalidTimeout(value)),
            })
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let transport = match var("IDF_TRANSPORT").map(|value| value.to_ascii_lowercase()) {
            None => Transport::Stdio,
            Some(value) => match value.as_str() {
                "stdio" => Transport::Stdio,
                "http" => Transport::Http,
                _ => return Err(ConfigError::InvalidTransport(value)),
            },
        };

        let bind_addr = var("IDF_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_port = var("IDF_BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort(value)))
            .transpose()?
            .unwrap_or(DEFAULT_BIND_PORT);
        let socket = format!("{}:{}", bind_addr, bind_port);
        let bind_socket = socket
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket(socket))?;

        Ok(Self {
            request: MonitoringRequest {
                endpoint,
                api_key,
                destination_ref,
            },
            origin_name: var("IDF_ORIGIN_NAME").unwrap_or_else(|| DEFAULT_ORIGIN_NAME.to_string()),
            destination_name: var("IDF_DESTINATION_NAME")
                .unwrap_or_else(|| DEFAULT_DESTINATION_NAME.to_string()),
            timezone,
            timeout,
            transport,
            bind_socket,
        })
    }
}
