//! Verdict Infrastructure - Adapters and implementations
//!
//! This crate provides the concrete side of the Verdict HTTP testing helper:
//! the `reqwest` session behind the [`HttpSession`](verdict_application::HttpSession)
//! port, authenticators, wire body building, the [`Call`] object, response
//! renderings, assertion predicates and the logging sink.

pub mod adapters;
pub mod auth;
pub mod call;
pub mod formatter;
pub mod http;
pub mod logging;
pub mod serialization;
pub mod testing;

pub use adapters::ReqwestSession;
pub use auth::{
    Authenticator, DigestAuthenticator, DigestChallenge, StaticAuthenticator, authenticator_for,
};
pub use call::Call;
pub use formatter::{ResponseFormat, history, summary, transcript};
pub use http::{BodyBuildError, BuiltBody, build_body};
pub use logging::{LOG_ENV, LOG_FILE, LogSink, init_logger};
pub use serialization::{SerializationError, normalize_json, to_json_stable};
pub use testing::{Assertions, SelectorError};
