//! TLS verification policy and transport classification.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Certificate verification settings for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsPolicy {
    /// Whether to verify server certificates.
    #[serde(default = "default_true")]
    pub verify: bool,
    /// Silence the warning emitted when `verify` is off.
    #[serde(default)]
    pub suppress_warning: bool,
}

impl Default for TlsPolicy {
    fn default() -> Self {
        Self {
            verify: true,
            suppress_warning: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

impl TlsPolicy {
    /// A policy that skips certificate verification.
    #[must_use]
    pub const fn insecure(suppress_warning: bool) -> Self {
        Self {
            verify: false,
            suppress_warning,
        }
    }

    /// Warnings this policy should emit for a target URL.
    ///
    /// Verification warnings are dropped when `suppress_warning` is set.
    #[must_use]
    pub fn security_warnings(&self, url: &Url) -> Vec<TlsSecurityWarning> {
        let mut warnings = vec![];

        if !self.verify && !self.suppress_warning {
            warnings.push(TlsSecurityWarning::CertificateVerificationDisabled);
        }

        if url.scheme() == "http" {
            warnings.push(TlsSecurityWarning::PlaintextTransport);
        }

        warnings
    }
}

/// TLS security warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsSecurityWarning {
    /// Certificate verification is disabled.
    CertificateVerificationDisabled,
    /// The target is reached over plain HTTP.
    PlaintextTransport,
}

impl TlsSecurityWarning {
    /// Get a user-friendly message for this warning.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::CertificateVerificationDisabled => {
                "Certificate verification is disabled. This makes connections vulnerable to \
                 man-in-the-middle attacks."
            }
            Self::PlaintextTransport => {
                "Request is sent over HTTP. The transport is not encrypted and the server \
                 identity is not verified."
            }
        }
    }
}

/// How a URL's transport is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportSecurity {
    /// `https`
    Secure,
    /// `http`
    Insecure,
}

impl TransportSecurity {
    /// Classifies the scheme of `url`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedScheme` for anything other than `http` or `https`.
    pub fn of(url: &Url) -> DomainResult<Self> {
        Self::from_scheme(url.scheme())
    }

    /// Classifies a bare scheme string.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedScheme` for anything other than `http` or `https`.
    pub fn from_scheme(scheme: &str) -> DomainResult<Self> {
        match scheme {
            "https" => Ok(Self::Secure),
            "http" => Ok(Self::Insecure),
            other => Err(DomainError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Mount prefix for this transport (`https://` or `http://`).
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Secure => "https://",
            Self::Insecure => "http://",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_policy_is_secure() {
        let policy = TlsPolicy::default();
        assert!(policy.verify);
        let url = Url::parse("https://example.test").unwrap();
        assert!(policy.security_warnings(&url).is_empty());
    }

    #[test]
    fn test_insecure_policy_warns_unless_suppressed() {
        let url = Url::parse("https://example.test").unwrap();
        assert_eq!(
            TlsPolicy::insecure(false).security_warnings(&url),
            vec![TlsSecurityWarning::CertificateVerificationDisabled]
        );
        assert!(TlsPolicy::insecure(true).security_warnings(&url).is_empty());
    }

    #[test]
    fn test_plain_http_warns() {
        let url = Url::parse("http://example.test").unwrap();
        assert_eq!(
            TlsPolicy::default().security_warnings(&url),
            vec![TlsSecurityWarning::PlaintextTransport]
        );
    }

    #[test]
    fn test_transport_classification() {
        assert_eq!(
            TransportSecurity::from_scheme("https"),
            Ok(TransportSecurity::Secure)
        );
        assert_eq!(
            TransportSecurity::from_scheme("http"),
            Ok(TransportSecurity::Insecure)
        );
        assert_eq!(
            TransportSecurity::from_scheme("ftp"),
            Err(DomainError::UnsupportedScheme("ftp".to_string()))
        );
        assert_eq!(TransportSecurity::Secure.prefix(), "https://");
    }

    #[test]
    fn test_deserialize_defaults() {
        let policy: TlsPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, TlsPolicy::default());
    }
}
