//! Authentication domain types

mod types;

pub use types::{ApiKeyLocation, AuthConfig, AuthResolution, DEFAULT_API_KEY_HEADER};
