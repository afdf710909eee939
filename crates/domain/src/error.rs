//! Domain error types

use thiserror::Error;

/// Configuration errors raised while a call is being constructed.
///
/// These never occur during a send: a `RequestSpec` either comes out of
/// normalization fully valid or not at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not one of GET, PUT, POST, DELETE, PATCH.
    #[error("method not supported: {0}")]
    UnsupportedMethod(String),

    /// The provided URL is empty, relative or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// A proxy map was given without an `https` entry.
    #[error("proxy must be configured for HTTPS over HTTP")]
    ProxyRequiresHttps,

    /// A proxy entry is malformed.
    #[error("invalid proxy for '{scheme}': {reason}")]
    InvalidProxy {
        /// Scheme key of the offending entry.
        scheme: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Authentication parameters have the wrong shape.
    #[error("invalid auth configuration: {0}")]
    InvalidAuth(String),

    /// Timeout is not a positive, finite number of seconds.
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    /// A header name is invalid.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// A header value is invalid.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(String),

    /// The URL scheme is neither `http` nor `https`.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// A rendering format name is unknown.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
