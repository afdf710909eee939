//! Session lifecycle.

use std::fmt;

use thiserror::Error;

/// Lifecycle of the pooled connection handle owned by one call.
///
/// `Uninitialized -> SessionOpen -> (RetryMounted | RetryDisabled) -> Sent -> Closed`.
/// Closing is legal from every state and closing twice is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing allocated yet.
    #[default]
    Uninitialized,
    /// Client built, no retry decision made.
    SessionOpen,
    /// Retry adapter mounted on the target scheme.
    RetryMounted,
    /// Retry turned off.
    RetryDisabled,
    /// The request went out and a response was captured.
    Sent,
    /// Released; no further sends.
    Closed,
}

/// An illegal lifecycle step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal session transition {from} -> {to}")]
pub struct InvalidTransition {
    /// State before the step.
    pub from: SessionState,
    /// Requested state.
    pub to: SessionState,
}

impl SessionState {
    /// Returns true if a send may be issued from this state.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::RetryMounted | Self::RetryDisabled)
    }

    /// Returns true once the session is released.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Moves to `next` if the step is legal.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for any step outside the lifecycle.
    pub const fn advance(self, next: Self) -> Result<Self, InvalidTransition> {
        let legal = matches!(
            (self, next),
            (Self::Uninitialized, Self::SessionOpen)
                | (Self::SessionOpen, Self::RetryMounted | Self::RetryDisabled)
                | (Self::RetryMounted | Self::RetryDisabled, Self::Sent)
                | (_, Self::Closed)
        );
        if legal {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "Uninitialized",
            Self::SessionOpen => "SessionOpen",
            Self::RetryMounted => "RetryMounted",
            Self::RetryDisabled => "RetryDisabled",
            Self::Sent => "Sent",
            Self::Closed => "Closed",
        };
        f.write_str(name)
    }
}
