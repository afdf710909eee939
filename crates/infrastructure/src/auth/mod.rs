//! Authenticators applied to outgoing requests.
//!
//! Every [`AuthConfig`](verdict_domain::AuthConfig) strategy maps to an
//! [`Authenticator`]. Static strategies mutate the request once; digest sends
//! unauthenticated and answers the server's `401` challenge.

mod authenticator;
mod digest;

pub use authenticator::{Authenticator, StaticAuthenticator, authenticator_for};
pub use digest::{DigestAuthenticator, DigestChallenge};

use reqwest::blocking::Request;
use verdict_application::TransportError;

fn rejected(request: &Request, message: impl Into<String>) -> TransportError {
    TransportError::Other {
        method: request.method().as_str().parse().unwrap_or_default(),
        url: request.url().to_string(),
        message: message.into(),
    }
}
