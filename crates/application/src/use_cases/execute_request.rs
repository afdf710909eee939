//! Execute Request Use Case
//!
//! Sends one normalized request through an [`HttpSession`] and returns the
//! captured response. The use case never loops: re-sending is the session's
//! retry policy alone. With `raise_for_status` set, a 4xx or 5xx answer is
//! returned as `TransportError::Status`.

use tracing::{info, warn};
use verdict_domain::{CapturedResponse, RequestSpec, TransportSecurity};

use crate::error::{ApplicationError, ApplicationResult, TransportError};
use crate::ports::HttpSession;

/// Use case for executing HTTP requests.
///
/// # Example
///
/// ```ignore
/// let spec = RequestOptions::new("GET", "https://api.example.com/users").normalize()?;
/// let mut use_case = ExecuteRequest::new(ReqwestSession::open(&spec)?);
/// let response = use_case.execute(&spec)?;
/// ```
pub struct ExecuteRequest<S: HttpSession> {
    session: S,
    raise_for_status: bool,
}

impl<S: HttpSession> ExecuteRequest<S> {
    /// Creates the use case around an open session.
    pub const fn new(session: S) -> Self {
        Self {
            session,
            raise_for_status: false,
        }
    }

    /// Turns 4xx and 5xx responses into errors.
    #[must_use]
    pub const fn raise_for_status(mut self, raise: bool) -> Self {
        self.raise_for_status = raise;
        self
    }

    /// Executes the request and returns the captured response.
    ///
    /// # Errors
    ///
    /// Returns `Domain(UnsupportedScheme)` for a non-HTTP URL and `Transport`
    /// for any send failure, or for an error status when raising is on.
    pub fn execute(&mut self, request: &RequestSpec) -> ApplicationResult<CapturedResponse> {
        if TransportSecurity::of(request.url())? == TransportSecurity::Insecure {
            warn!(url = %request.url(), "sending over plain HTTP");
        }

        let response = self.session.send(request).map_err(|e| {
            warn!(kind = e.kind(), error = %e, "request failed");
            ApplicationError::from(e)
        })?;

        info!(
            method = %request.method(),
            url = %request.full_url(),
            status = response.status().as_u16(),
            elapsed_secs = response.elapsed_secs(),
            "request completed"
        );

        let status = response.status();
        if self.raise_for_status && status.as_u16() >= 400 {
            let err = TransportError::Status {
                method: request.method(),
                url: request.full_url().to_string(),
                status: status.as_u16(),
                reason: status.reason_phrase().to_string(),
            };
            warn!(kind = err.kind(), error = %err, "error status raised");
            return Err(err.into());
        }
        Ok(response)
    }

    /// Borrows the session.
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Mutably borrows the session.
    pub const fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    /// Closes the session and returns it.
    pub fn into_session(mut self) -> S {
        self.session.close();
        self.session
    }
}
