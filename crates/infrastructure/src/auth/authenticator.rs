//! The authenticator seam and the static strategies.

use reqwest::blocking::Request;
use reqwest::header::{HeaderName, HeaderValue};
use verdict_application::TransportError;
use verdict_domain::{AuthConfig, AuthResolution};

use super::digest::DigestAuthenticator;
use super::rejected;

/// Applies credentials to an outgoing request.
pub trait Authenticator: Send + Sync {
    /// Adds credentials before the first send.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Other` when a credential cannot be encoded as
    /// a header.
    fn mutate(&self, request: Request) -> Result<Request, TransportError>;

    /// Whether this authenticator waits for a `401` challenge.
    fn expects_challenge(&self) -> bool {
        false
    }

    /// Computes the `Authorization` value answering a `WWW-Authenticate`
    /// challenge, or `None` if the challenge is not understood.
    fn challenge(&self, _request: &Request, _www_authenticate: &str) -> Option<String> {
        None
    }
}

/// Bearer, basic-token, API-key and basic strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAuthenticator {
    resolution: AuthResolution,
}

impl StaticAuthenticator {
    /// Wraps an already resolved strategy.
    #[must_use]
    pub const fn new(resolution: AuthResolution) -> Self {
        Self { resolution }
    }
}

impl Authenticator for StaticAuthenticator {
    fn mutate(&self, mut request: Request) -> Result<Request, TransportError> {
        match &self.resolution {
            AuthResolution::Header { name, value } => {
                let header_name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| {
                        rejected(&request, format!("invalid auth header name {name}: {e}"))
                    })?;
                let header_value = HeaderValue::from_str(value)
                    .map_err(|e| rejected(&request, format!("invalid auth header value: {e}")))?;
                request.headers_mut().insert(header_name, header_value);
            }
            AuthResolution::QueryParam { name, value } => {
                request.url_mut().query_pairs_mut().append_pair(name, value);
            }
            AuthResolution::None | AuthResolution::AwaitChallenge => {}
        }
        Ok(request)
    }
}

/// Picks the authenticator for a configured strategy.
#[must_use]
pub fn authenticator_for(config: &AuthConfig) -> Box<dyn Authenticator> {
    match config {
        AuthConfig::Digest { username, password } => {
            Box::new(DigestAuthenticator::new(username.clone(), password.clone()))
        }
        other => Box::new(StaticAuthenticator::new(other.resolve())),
    }
}
