//! Proxy configuration: command-line flags with environment fallbacks.

use std::net::AddrParseError;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use url::Url;

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Retired API surfaces that answer 404 without reaching the backend.
pub const DEFAULT_DEPRECATED_PREFIXES: &[&str] = &["/api/legacy/", "/api/v0/", "/api/rfq-v1/"];

#[derive(Debug, Parser)]
#[command(
    name = "hedgedesk-proxy",
    about = "Forward dashboard /api requests to the hedge backend"
)]
pub struct ProxyArgs {
    /// Address to listen on.
    #[arg(long, env = "HEDGEDESK_PROXY_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Backend base URL, e.g. https://backend.example.com/v2.
    #[arg(long = "backend", env = "HEDGEDESK_API_BASE_URL")]
    pub backend_base: Option<String>,

    /// Upstream request timeout in seconds.
    #[arg(
        long = "timeout",
        env = "HEDGEDESK_PROXY_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub timeout_secs: u64,

    /// Deprecated path prefix (repeatable, or comma separated in the env var).
    #[arg(
        long = "deprecated-prefix",
        env = "HEDGEDESK_DEPRECATED_PREFIXES",
        value_delimiter = ','
    )]
    pub deprecated_prefixes: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address '{value}': {source}")]
    InvalidBind {
        value: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid backend base url '{value}': {source}")]
    InvalidBackendBase {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend base url must use http or https, got '{0}'")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind: SocketAddr,
    /// Missing base is not fatal at startup: `/api` requests answer 500.
    pub backend_base: Option<Url>,
    pub timeout: Duration,
    pub deprecated_prefixes: Vec<String>,
}

impl ProxyConfig {
    /// Config for `bind` with the default timeout and deprecated prefixes.
    pub fn new(bind: SocketAddr, backend_base: Option<Url>) -> Self {
        Self {
            bind,
            backend_base,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            deprecated_prefixes: default_deprecated_prefixes(),
        }
    }

    pub fn from_args(args: ProxyArgs) -> Result<Self, ConfigError> {
        let bind: SocketAddr = args
            .bind
            .parse()
            .map_err(|source| ConfigError::InvalidBind {
                value: args.bind.clone(),
                source,
            })?;

        let backend_base = match args.backend_base.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_backend_base(raw)?),
        };

        let deprecated_prefixes: Vec<String> = args
            .deprecated_prefixes
            .iter()
            .map(String::as_str)
            .map(str::trim)
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            bind,
            backend_base,
            timeout: Duration::from_secs(args.timeout_secs),
            deprecated_prefixes: if deprecated_prefixes.is_empty() {
                default_deprecated_prefixes()
            } else {
                deprecated_prefixes
            },
        })
    }
}

fn parse_backend_base(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|source| ConfigError::InvalidBackendBase {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

fn default_deprecated_prefixes() -> Vec<String> {
    DEFAULT_DEPRECATED_PREFIXES
        .iter()
        .map(|prefix| (*prefix).to_string())
        .collect()
}
