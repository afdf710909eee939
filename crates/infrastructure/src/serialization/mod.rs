//! Deterministic JSON serialization.
//!
//! Used by the response formatter and by the JSON equality predicates:
//! - 2-space indentation
//! - Trailing newline
//! - Serialize/parse round-trip to neutralize key order

mod json;

pub use json::*;
