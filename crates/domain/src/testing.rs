//! Assertion outcome types.
//!
//! A predicate either passes with the caller's success message or fails with
//! an [`AssertionFailure`] describing what was observed.

use std::fmt;

/// A failed check against a captured response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionFailure {
    /// What was observed.
    pub actual: String,
    /// What was expected, when the predicate has an expectation.
    pub expected: Option<String>,
    /// Human-readable reason.
    pub message: String,
}

impl AssertionFailure {
    /// Creates a failure without an expected value.
    #[must_use]
    pub fn new(message: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            actual: actual.into(),
            expected: None,
            message: message.into(),
        }
    }

    /// Attaches the expected value.
    #[must_use]
    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (actual: {}", self.message, self.actual)?;
        if let Some(expected) = &self.expected {
            write!(f, ", expected: {expected}")?;
        }
        f.write_str(")")
    }
}

impl std::error::Error for AssertionFailure {}

/// Pass carries the caller-supplied message.
pub type AssertionOutcome = Result<String, AssertionFailure>;

/// Tally of several outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssertionSummary {
    /// Success messages, in order.
    pub passed: Vec<String>,
    /// Failures, in order.
    pub failed: Vec<AssertionFailure>,
}

impl AssertionSummary {
    /// Creates an empty summary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one outcome.
    pub fn record(&mut self, outcome: AssertionOutcome) {
        match outcome {
            Ok(message) => self.passed.push(message),
            Err(failure) => self.failed.push(failure),
        }
    }

    /// Total number of recorded outcomes.
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed.len() + self.failed.len()
    }

    /// Check if all recorded outcomes passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total() == 0 {
            100.0
        } else {
            (self.passed.len() as f64 / self.total() as f64) * 100.0
        }
    }
}

impl FromIterator<AssertionOutcome> for AssertionSummary {
    fn from_iter<T: IntoIterator<Item = AssertionOutcome>>(iter: T) -> Self {
        let mut summary = Self::new();
        for outcome in iter {
            summary.record(outcome);
        }
        summary
    }
}
