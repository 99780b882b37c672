//! Backend client error types.

use std::fmt;

/// Errors from a single call to the backend endpoint.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// HTTP transport error (connection refused, DNS, timeout).
    #[error("HTTP error calling {action}: {source}")]
    Http {
        action: String,
        source: reqwest::Error,
    },
    /// Backend returned a non-2xx status.
    #[error("backend {action} returned {status}: {body}")]
    ApiError {
        action: String,
        status: u16,
        body: String,
    },
    /// Response body was not the expected JSON shape.
    #[error("failed to deserialize response from {action}: {source}")]
    Deserialization {
        action: String,
        source: reqwest::Error,
    },
    /// Request body could not be serialized.
    #[error("failed to serialize request for {action}: {source}")]
    Serialization {
        action: String,
        source: serde_json::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] super::config::ConfigError),
}

/// Why a call did not produce a usable reply.
///
/// A transport failure says nothing about whether the backend acted on the
/// request: the write may have landed even though the reply was lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request could not be delivered or the connection dropped.
    Unreachable(String),
    /// The request exceeded the configured timeout.
    Timeout,
    /// The backend answered with a non-2xx status.
    HttpStatus(u16),
    /// The backend answered with a body that is not the expected JSON.
    MalformedResponse(String),
    /// The client could not be set up for the call.
    Misconfigured(String),
}

impl From<&GatewayError> for TransportFailure {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::Http { source, .. } if source.is_timeout() => Self::Timeout,
            GatewayError::Http { source, .. } => Self::Unreachable(source.to_string()),
            GatewayError::ApiError { status, .. } => Self::HttpStatus(*status),
            GatewayError::Deserialization { source, .. } if source.is_timeout() => Self::Timeout,
            GatewayError::Deserialization { source, .. } => {
                Self::MalformedResponse(source.to_string())
            }
            GatewayError::Serialization { source, .. } => Self::Misconfigured(source.to_string()),
            GatewayError::Config(e) => Self::Misconfigured(e.to_string()),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(reason) => write!(f, "network unreachable: {reason}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::HttpStatus(status) => write!(f, "backend returned HTTP {status}"),
            Self::MalformedResponse(reason) => write!(f, "malformed response: {reason}"),
            Self::Misconfigured(reason) => write!(f, "client misconfigured: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_maps_to_http_status() {
        let err = GatewayError::ApiError {
            action: "submitParcelDeclaration".into(),
            status: 502,
            body: "Bad Gateway".into(),
        };
        assert_eq!(TransportFailure::from(&err), TransportFailure::HttpStatus(502));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn config_error_maps_to_misconfigured() {
        let err = GatewayError::Config(crate::config::ConfigError::MissingEndpoint);
        assert!(matches!(
            TransportFailure::from(&err),
            TransportFailure::Misconfigured(_)
        ));
    }

    #[test]
    fn display_names_the_failure_kind() {
        assert_eq!(TransportFailure::Timeout.to_string(), "request timed out");
        assert_eq!(
            TransportFailure::HttpStatus(500).to_string(),
            "backend returned HTTP 500"
        );
    }
}
