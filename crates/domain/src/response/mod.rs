//! HTTP Response domain types

mod spec;

pub use spec::{CapturedResponse, RedirectHop, RequestEcho, StatusCode};
