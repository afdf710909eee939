//! HTTP Session port

use verdict_domain::{CapturedResponse, RequestSpec};

use crate::error::TransportError;
use crate::session::SessionState;

/// Port for a pooled, closable HTTP session.
///
/// This trait abstracts the HTTP client implementation, allowing
/// the application layer to be independent of specific HTTP libraries.
pub trait HttpSession: Send {
    /// Sends the request, applying the session's retry policy, and captures
    /// the response.
    ///
    /// # Errors
    ///
    /// Returns a classified `TransportError` if no response could be
    /// captured, or `SessionClosed` after [`HttpSession::close`].
    fn send(&mut self, request: &RequestSpec) -> Result<CapturedResponse, TransportError>;

    /// Releases pooled connections. Calling it again does nothing.
    fn close(&mut self);

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// Returns true once closed.
    fn is_closed(&self) -> bool {
        self.state().is_closed()
    }
}
