//! Backend client configuration.
//!
//! One endpoint URL serves every action. Override via environment variables
//! or explicit construction for staging/testing.

use url::Url;

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
/// Default number of confirmation polls after a submission.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 5;
/// Default delay between confirmation polls, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1_500;

/// Configuration for talking to the declaration backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The action-dispatched endpoint (e.g. a deployed web-app `/exec` URL).
    pub endpoint_url: Url,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Confirmation polls attempted after a submission.
    pub poll_attempts: u32,
    /// Delay between confirmation polls, in milliseconds.
    pub poll_interval_ms: u64,
}

impl ClientConfig {
    /// Configuration with default timeout and polling for `endpoint_url`.
    pub fn new(endpoint_url: Url) -> Self {
        Self {
            endpoint_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Reject settings no request could succeed with.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PARCEL_ENDPOINT_URL` (required)
    /// - `PARCEL_TIMEOUT_SECS` (default: 15)
    /// - `PARCEL_POLL_ATTEMPTS` (default: 5)
    /// - `PARCEL_POLL_INTERVAL_MS` (default: 1500)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("PARCEL_ENDPOINT_URL").map_err(|_| ConfigError::MissingEndpoint)?;
        let endpoint_url = parse_endpoint(&raw)?;

        Ok(Self {
            endpoint_url,
            timeout_secs: env_number("PARCEL_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS),
            poll_attempts: env_number("PARCEL_POLL_ATTEMPTS").unwrap_or(DEFAULT_POLL_ATTEMPTS),
            poll_interval_ms: env_number("PARCEL_POLL_INTERVAL_MS")
                .unwrap_or(DEFAULT_POLL_INTERVAL_MS),
        })
    }

    /// Create a configuration pointing to a local mock server (for testing).
    ///
    /// Polling is shortened to keep tests fast.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed.
    pub fn local_mock(port: u16) -> Result<Self, ConfigError> {
        let endpoint_url = parse_endpoint(&format!("http://127.0.0.1:{port}/exec"))?;
        Ok(Self {
            endpoint_url,
            timeout_secs: 5,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            poll_interval_ms: 10,
        })
    }
}

/// Parse and check an endpoint URL. Only `http` and `https` are accepted.
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            raw.to_string(),
            format!("unsupported scheme {other:?}"),
        )),
    }
}

fn env_number<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|s| s.trim().parse().ok())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PARCEL_ENDPOINT_URL environment variable is required")]
    MissingEndpoint,
    #[error("invalid endpoint URL {0:?}: {1}")]
    InvalidUrl(String, String),
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}
