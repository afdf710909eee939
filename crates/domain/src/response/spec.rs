//! Captured response type
//!
//! Contains types for representing an executed call: status code, headers,
//! body, timing, redirect history and the request that produced it.

use std::time::Duration;

use url::Url;

use crate::cookie::Cookie;
use crate::request::{Headers, HttpMethod};

/// HTTP status code with semantic helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Creates a new `StatusCode`.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric status code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns true for exactly `200`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.0 == 200
    }

    /// Returns true if this is a 2xx success status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is a 3xx redirection status.
    #[must_use]
    pub const fn is_redirection(&self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Returns true if this is a 4xx client error status.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a 5xx server error status.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Returns the canonical reason phrase for common status codes.
    #[must_use]
    pub const fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            408 => "Request Timeout",
            409 => "Conflict",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "Unknown",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// One intermediate response of a followed redirect chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectHop {
    /// Status of the redirecting response.
    pub status: StatusCode,
    /// URL that answered with the redirect.
    pub url: Url,
}

/// The request as it actually went out on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEcho {
    /// HTTP method.
    pub method: HttpMethod,
    /// URL including query parameters.
    pub url: Url,
    /// Headers sent, including auth and content-type.
    pub headers: Headers,
    /// Body bytes; empty for multipart bodies, which are streamed.
    pub body: Vec<u8>,
}

/// The single recorded result of executing a request.
///
/// Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
    text: String,
    elapsed: Duration,
    final_url: Url,
    history: Vec<RedirectHop>,
    cookies: Vec<Cookie>,
    request: RequestEcho,
    redirects_enabled: bool,
}

impl CapturedResponse {
    /// Creates a response with empty history and no cookies.
    #[must_use]
    pub fn new(
        status: impl Into<StatusCode>,
        headers: Headers,
        body: Vec<u8>,
        elapsed: Duration,
        request: RequestEcho,
    ) -> Self {
        let text = String::from_utf8_lossy(&body).into_owned();
        Self {
            status: status.into(),
            headers,
            body,
            text,
            elapsed,
            final_url: request.url.clone(),
            history: Vec::new(),
            cookies: Vec::new(),
            request,
            redirects_enabled: false,
        }
    }

    /// Sets the URL that produced the final response.
    #[must_use]
    pub fn with_final_url(mut self, url: Url) -> Self {
        self.final_url = url;
        self
    }

    /// Sets the redirect chain and whether following was enabled.
    #[must_use]
    pub fn with_history(mut self, history: Vec<RedirectHop>, redirects_enabled: bool) -> Self {
        self.history = history;
        self.redirects_enabled = redirects_enabled;
        self
    }

    /// Sets the cookies parsed from `Set-Cookie`.
    #[must_use]
    pub fn with_cookies(mut self, cookies: Vec<Cookie>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Raw body bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8; invalid sequences are replaced.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the body is not JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }

    /// Returns true if the content type indicates JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.contains("application/json") || ct.contains("+json"))
    }

    /// Time from dispatch to full body receipt.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// URL of the final response.
    #[must_use]
    pub const fn final_url(&self) -> &Url {
        &self.final_url
    }

    /// Intermediate redirect responses, oldest first.
    #[must_use]
    pub fn history(&self) -> &[RedirectHop] {
        &self.history
    }

    /// Whether redirect following was enabled for the call.
    #[must_use]
    pub const fn redirects_enabled(&self) -> bool {
        self.redirects_enabled
    }

    /// Cookies set by the response.
    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// The request that produced this response.
    #[must_use]
    pub const fn request(&self) -> &RequestEcho {
        &self.request
    }
}
