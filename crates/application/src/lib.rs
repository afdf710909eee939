//! Verdict Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Call configuration and its normalization
//! - The retry policy and session lifecycle
//! - Port traits (interfaces for external dependencies)
//! - Application-level error handling

pub mod error;
pub mod normalizer;
pub mod ports;
pub mod retry;
pub mod session;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult, TransportError};
pub use normalizer::RequestOptions;
pub use ports::HttpSession;
pub use retry::{AttemptOutcome, RetryMount, RetryPolicy};
pub use session::{InvalidTransition, SessionState};
pub use use_cases::ExecuteRequest;
