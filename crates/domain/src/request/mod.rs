//! HTTP Request domain types

mod body;
mod header;
mod method;
mod spec;

pub use body::{BodyKind, FilePart, RequestBody};
pub use header::{Header, Headers, VERSION};
pub use method::HttpMethod;
pub use spec::{RequestSpec, parse_url};
