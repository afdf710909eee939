//! Application error types

use thiserror::Error;
use verdict_domain::{DomainError, HttpMethod};

/// Classified failure of a send.
///
/// Every variant names the method and URL so the failing call can be
/// reproduced from the message alone.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// No complete response arrived within the timeout.
    #[error("{method} {url}: request timed out after {timeout_secs:.2}s")]
    Timeout {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: f64,
    },

    /// DNS failure, refused or reset connection.
    #[error("{method} {url}: connection failed: {message}")]
    Connection {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Underlying error text.
        message: String,
    },

    /// Certificate or scheme problem.
    #[error("{method} {url}: TLS error: {message}")]
    Tls {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Underlying error text.
        message: String,
    },

    /// The response could not be decoded as requested.
    #[error("{method} {url}: unable to decode the HTTP response: {message}")]
    Decode {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Underlying error text.
        message: String,
    },

    /// A body part could not be prepared (e.g. unreadable file).
    #[error("{method} {url}: invalid request body: {message}")]
    InvalidBody {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Underlying error text.
        message: String,
    },

    /// The session was closed before the send.
    #[error("{method} {url}: session is closed")]
    SessionClosed {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
    },

    /// A 4xx or 5xx answer to a call that raises on error statuses.
    #[error("{method} {url}: HTTP error status {status} {reason}")]
    Status {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Response status code.
        status: u16,
        /// Reason phrase.
        reason: String,
    },

    /// Any other transport failure.
    #[error("{method} {url}: {message}")]
    Other {
        /// Request method.
        method: HttpMethod,
        /// Request URL.
        url: String,
        /// Underlying error text.
        message: String,
    },
}

impl TransportError {
    /// Returns true for failures the retry policy may re-send after.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }

    /// Short name of the failure class, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connection { .. } => "connection",
            Self::Tls { .. } => "tls",
            Self::Decode { .. } => "decode",
            Self::InvalidBody { .. } => "invalid_body",
            Self::SessionClosed { .. } => "session_closed",
            Self::Status { .. } => "status",
            Self::Other { .. } => "other",
        }
    }
}

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The call configuration is invalid.
    #[error("configuration error: {0}")]
    Domain(#[from] DomainError),

    /// The send failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A YAML or JSON call definition could not be parsed.
    #[error("invalid call definition: {0}")]
    Definition(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transport_messages_carry_method_and_url() {
        let err = TransportError::Timeout {
            method: HttpMethod::Get,
            url: "https://example.test/slow".to_string(),
            timeout_secs: 1.5,
        };
        assert_eq!(
            err.to_string(),
            "GET https://example.test/slow: request timed out after 1.50s"
        );

        let err = TransportError::Connection {
            method: HttpMethod::Post,
            url: "http://127.0.0.1:1/".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "POST http://127.0.0.1:1/: connection failed: connection refused"
        );
    }

    #[test]
    fn test_transient_classification() {
        let closed = TransportError::SessionClosed {
            method: HttpMethod::Get,
            url: "https://example.test".to_string(),
        };
        assert!(!closed.is_transient());
        assert_eq!(closed.kind(), "session_closed");
    }

    #[test]
    fn test_status_error() {
        let err = TransportError::Status {
            method: HttpMethod::Get,
            url: "https://example.test/missing".to_string(),
            status: 404,
            reason: "Not Found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GET https://example.test/missing: HTTP error status 404 Not Found"
        );
        assert_eq!(err.kind(), "status");
        assert!(!err.is_transient());
    }

    #[test]
    fn test_application_error_from_domain() {
        let err: ApplicationError = DomainError::ProxyRequiresHttps.into();
        assert_eq!(
            err.to_string(),
            "configuration error: proxy must be configured for HTTPS over HTTP"
        );
    }
}
