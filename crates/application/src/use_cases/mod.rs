//! Use case implementations

mod execute_request;

pub use execute_request::ExecuteRequest;
