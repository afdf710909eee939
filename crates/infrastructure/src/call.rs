//! The call object: one executed request, its captured response and the
//! session that carried it.

use std::fmt;

use tracing::{debug, info};
use verdict_application::{
    ApplicationResult, ExecuteRequest, HttpSession, RequestOptions, TransportError,
};
use verdict_domain::{CapturedResponse, RequestSpec};

use crate::adapters::ReqwestSession;
use crate::formatter::{self, ResponseFormat};
use crate::logging::init_logger;
use crate::testing::Assertions;

/// An executed HTTP call.
///
/// The session closes when the call is dropped; [`Call::close`] releases it
/// earlier. The response stays readable either way.
///
/// # Example
///
/// ```ignore
/// let call = Call::send(RequestOptions::new("GET", "https://api.example.com/posts"))?;
/// call.assertions().assert_is_ok("posts are listed")?;
/// ```
pub struct Call {
    spec: RequestSpec,
    response: CapturedResponse,
    executor: ExecuteRequest<ReqwestSession>,
}

impl Call {
    /// Normalizes `options`, opens a session and sends the request.
    ///
    /// # Errors
    ///
    /// Returns `Domain` for invalid configuration (before any network I/O)
    /// and `Transport` for a failed send. With `raise_for_status` set, a 4xx
    /// or 5xx answer is a `Transport(Status)` error.
    pub fn send(options: RequestOptions) -> ApplicationResult<Self> {
        init_logger(options.logger_enabled());
        let raise = options.raises_for_status();

        let spec = options.normalize()?;
        info!("HTTP Request {} => {}", spec.method(), spec.full_url());
        for header in spec.headers().iter() {
            debug!("{} : {}", header.name, header.value);
        }

        let session = ReqwestSession::open(&spec)?;
        let mut executor = ExecuteRequest::new(session).raise_for_status(raise);
        let response = executor.execute(&spec)?;
        info!("HTTP Response {}", response.status());

        Ok(Self {
            spec,
            response,
            executor,
        })
    }

    /// Parses a YAML call definition and sends it.
    ///
    /// # Errors
    ///
    /// Returns `Definition` for a malformed document, otherwise as
    /// [`Call::send`].
    pub fn from_yaml(source: &str) -> ApplicationResult<Self> {
        Self::send(RequestOptions::from_yaml_str(source)?)
    }

    /// The captured response.
    #[must_use]
    pub const fn response(&self) -> &CapturedResponse {
        &self.response
    }

    /// The normalized request that was sent.
    #[must_use]
    pub const fn request(&self) -> &RequestSpec {
        &self.spec
    }

    /// Predicates over the captured response.
    #[must_use]
    pub const fn assertions(&self) -> Assertions<'_> {
        Assertions::new(&self.response)
    }

    /// See [`formatter::summary`].
    ///
    /// # Errors
    ///
    /// Returns `Decode` when the body cannot be rendered in `format`.
    pub fn summary(&self, format: ResponseFormat) -> Result<String, TransportError> {
        formatter::summary(&self.response, format)
    }

    /// See [`formatter::transcript`].
    #[must_use]
    pub fn transcript(&self) -> String {
        formatter::transcript(&self.response)
    }

    /// See [`formatter::history`].
    #[must_use]
    pub fn history(&self) -> String {
        formatter::history(&self.response)
    }

    /// Releases the session. Calling it again does nothing.
    pub fn close(&mut self) {
        self.executor.session_mut().close();
    }

    /// Returns true once the session is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.executor.session().is_closed()
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Verdict HTTP request {} | {}",
            self.spec.full_url(),
            self.spec.method()
        )
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("method", &self.spec.method())
            .field("url", &self.spec.full_url().as_str())
            .field("status", &self.response.status().as_u16())
            .field("closed", &self.is_closed())
            .finish()
    }
}
