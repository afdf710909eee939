//! Verdict Domain - Core types
//!
//! This crate defines the domain model for the Verdict HTTP testing helper:
//! the normalized request, the captured response and assertion outcomes.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod cookie;
pub mod error;
pub mod proxy;
pub mod request;
pub mod response;
pub mod testing;
pub mod tls;

pub use auth::{ApiKeyLocation, AuthConfig, AuthResolution};
pub use cookie::{Cookie, SameSite};
pub use error::{DomainError, DomainResult};
pub use proxy::ProxyMap;
pub use request::{BodyKind, FilePart, Header, Headers, HttpMethod, RequestBody, RequestSpec};
pub use response::{CapturedResponse, RedirectHop, RequestEcho, StatusCode};
pub use testing::{AssertionFailure, AssertionOutcome, AssertionSummary};
pub use tls::{TlsPolicy, TlsSecurityWarning, TransportSecurity};
