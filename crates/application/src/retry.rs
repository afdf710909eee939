//! Bounded retry with exponential backoff.

use std::collections::BTreeSet;
use std::time::Duration;

use url::Url;
use verdict_domain::{DomainResult, HttpMethod, TransportSecurity};

use crate::error::TransportError;

/// What happened on one attempt.
#[derive(Debug, Clone, Copy)]
pub enum AttemptOutcome<'a> {
    /// A response arrived with this status.
    Status(u16),
    /// The send failed.
    Failed(&'a TransportError),
}

/// Retry policy applied by the session.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: usize,
    backoff_factor: f64,
    retryable_status_codes: BTreeSet<u16>,
    allowed_methods: Vec<HttpMethod>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl RetryPolicy {
    /// Three attempts, factor 0.3, statuses 429/500/502/503/504, idempotent verbs.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: 0.3,
            retryable_status_codes: [429_u16, 500, 502, 503, 504].into_iter().collect(),
            allowed_methods: HttpMethod::all()
                .iter()
                .copied()
                .filter(|m| m.is_idempotent())
                .collect(),
        }
    }

    /// A single attempt, never re-sent.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::standard()
        }
    }

    /// Sets the attempt budget (at least one).
    #[must_use]
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the backoff factor in seconds.
    #[must_use]
    pub fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor.max(0.0);
        self
    }

    /// Replaces the retryable status set.
    #[must_use]
    pub fn retryable_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.retryable_status_codes = codes.into_iter().collect();
        self
    }

    /// Total attempts, the first one included.
    #[must_use]
    pub const fn configured_max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns true if `method` may be re-sent.
    #[must_use]
    pub fn allows_method(&self, method: HttpMethod) -> bool {
        self.allowed_methods.contains(&method)
    }

    /// Returns true if `status` triggers a retry.
    #[must_use]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }

    /// Decides whether attempt number `attempt` (1-based) should be followed by another.
    #[must_use]
    pub fn should_retry(
        &self,
        method: HttpMethod,
        attempt: usize,
        outcome: AttemptOutcome<'_>,
    ) -> bool {
        if attempt >= self.max_attempts || !self.allows_method(method) {
            return false;
        }
        match outcome {
            AttemptOutcome::Status(status) => self.is_retryable_status(status),
            AttemptOutcome::Failed(error) => error.is_transient(),
        }
    }

    /// Delay before retry number `retry_index` (1-based): `factor * 2^(n-1)` seconds.
    #[must_use]
    pub fn backoff_for_retry(&self, retry_index: usize) -> Duration {
        let exponent = i32::try_from(retry_index.saturating_sub(1).min(31)).unwrap_or(31);
        Duration::try_from_secs_f64(self.backoff_factor * 2_f64.powi(exponent))
            .unwrap_or(Duration::ZERO)
    }
}

/// Where the retry adapter is mounted: the prefix of the scheme the target
/// URL actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryMount {
    transport: TransportSecurity,
}

impl RetryMount {
    /// Mount for the scheme of `url`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedScheme` for schemes other than `http`/`https`.
    pub fn for_url(url: &Url) -> DomainResult<Self> {
        Ok(Self {
            transport: TransportSecurity::of(url)?,
        })
    }

    /// `https://` or `http://`.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        self.transport.prefix()
    }

    /// Plain HTTP mounts carry no certificate guarantees.
    #[must_use]
    pub const fn is_insecure(&self) -> bool {
        matches!(self.transport, TransportSecurity::Insecure)
    }

    /// Returns true if `url` falls under this mount.
    #[must_use]
    pub fn matches(&self, url: &Url) -> bool {
        url.as_str().starts_with(self.prefix())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use verdict_domain::DomainError;

    fn timeout() -> TransportError {
        TransportError::Timeout {
            method: HttpMethod::Get,
            url: "https://example.test".to_string(),
            timeout_secs: 1.0,
        }
    }

    #[test]
    fn test_standard_policy() {
        let policy = RetryPolicy::standard();
        assert_eq!(policy.configured_max_attempts(), 3);
        for status in [429, 500, 502, 503, 504] {
            assert!(policy.is_retryable_status(status));
        }
        assert!(!policy.is_retryable_status(404));
        assert!(!policy.is_retryable_status(501));
    }

    #[test]
    fn test_only_idempotent_methods_retry() {
        let policy = RetryPolicy::standard();
        assert!(policy.allows_method(HttpMethod::Get));
        assert!(policy.allows_method(HttpMethod::Put));
        assert!(policy.allows_method(HttpMethod::Delete));
        assert!(!policy.allows_method(HttpMethod::Post));
        assert!(!policy.allows_method(HttpMethod::Patch));
        assert!(!policy.should_retry(HttpMethod::Post, 1, AttemptOutcome::Status(503)));
    }

    #[test]
    fn test_budget_is_bounded() {
        let policy = RetryPolicy::standard();
        assert!(policy.should_retry(HttpMethod::Get, 1, AttemptOutcome::Status(503)));
        assert!(policy.should_retry(HttpMethod::Get, 2, AttemptOutcome::Status(503)));
        assert!(!policy.should_retry(HttpMethod::Get, 3, AttemptOutcome::Status(503)));
    }

    #[test]
    fn test_transport_failures_retry() {
        let policy = RetryPolicy::standard();
        let err = timeout();
        assert!(policy.should_retry(HttpMethod::Get, 1, AttemptOutcome::Failed(&err)));

        let tls = TransportError::Tls {
            method: HttpMethod::Get,
            url: "https://example.test".to_string(),
            message: "bad certificate".to_string(),
        };
        assert!(!policy.should_retry(HttpMethod::Get, 1, AttemptOutcome::Failed(&tls)));
    }

    #[test]
    fn test_disabled_never_retries() {
        let policy = RetryPolicy::disabled();
        assert!(!policy.should_retry(HttpMethod::Get, 1, AttemptOutcome::Status(503)));
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::standard();
        for (retry, expected) in [(1, 0.3), (2, 0.6), (3, 1.2)] {
            let delay = policy.backoff_for_retry(retry).as_secs_f64();
            assert!((delay - expected).abs() < 1e-6, "retry {retry}: {delay}");
        }
        assert_eq!(
            RetryPolicy::standard().backoff_factor(0.0).backoff_for_retry(2),
            Duration::ZERO
        );
    }

    #[test]
    fn test_mount_follows_target_scheme() {
        let https = RetryMount::for_url(&Url::parse("https://example.test/a").unwrap()).unwrap();
        assert_eq!(https.prefix(), "https://");
        assert!(!https.is_insecure());
        assert!(https.matches(&Url::parse("https://other.test").unwrap()));
        assert!(!https.matches(&Url::parse("http://example.test").unwrap()));

        let http = RetryMount::for_url(&Url::parse("http://example.test/a").unwrap()).unwrap();
        assert_eq!(http.prefix(), "http://");
        assert!(http.is_insecure());
    }

    #[test]
    fn test_mount_rejects_other_schemes() {
        let result = RetryMount::for_url(&Url::parse("ftp://example.test").unwrap());
        assert_eq!(result, Err(DomainError::UnsupportedScheme("ftp".to_string())));
    }
}
