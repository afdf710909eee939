//! HTTP infrastructure utilities.
//!
//! Body building for JSON, form and multipart payloads.

mod body_builder;

pub use body_builder::{BodyBuildError, BuiltBody, build_body};
