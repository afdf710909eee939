//! Request specification type

use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use super::{Headers, HttpMethod, RequestBody};
use crate::auth::AuthConfig;
use crate::error::{DomainError, DomainResult};
use crate::proxy::ProxyMap;
use crate::tls::TlsPolicy;

/// Fully normalized description of one outbound call.
///
/// Fields are private: a `RequestSpec` can only hold a method from the allow
/// set, an absolute URL, a validated proxy map and a positive timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: HttpMethod,
    url: Url,
    headers: Headers,
    params: BTreeMap<String, String>,
    body: RequestBody,
    auth: Option<AuthConfig>,
    proxy: Option<ProxyMap>,
    timeout: Duration,
    allow_redirects: bool,
    retry: bool,
    tls: TlsPolicy,
}

impl RequestSpec {
    /// Creates a spec with empty headers and body, a 30 second timeout,
    /// retry enabled, redirects disabled and TLS verification on.
    #[must_use]
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            params: BTreeMap::new(),
            body: RequestBody::none(),
            auth: None,
            proxy: None,
            timeout: Duration::from_secs(30),
            allow_redirects: false,
            retry: true,
            tls: TlsPolicy::default(),
        }
    }

    /// Parses `url` and creates a spec for it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the URL is empty or not absolute.
    pub fn parse(method: HttpMethod, url: &str) -> DomainResult<Self> {
        Ok(Self::new(method, parse_url(url)?))
    }

    /// Sets the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets the auth strategy.
    #[must_use]
    pub fn with_auth(mut self, auth: Option<AuthConfig>) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the proxy map.
    #[must_use]
    pub fn with_proxy(mut self, proxy: Option<ProxyMap>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Sets the timeout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTimeout` for a zero duration.
    pub fn with_timeout(mut self, timeout: Duration) -> DomainResult<Self> {
        if timeout.is_zero() {
            return Err(DomainError::InvalidTimeout("timeout must be positive".to_string()));
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Sets whether redirects are followed.
    #[must_use]
    pub const fn with_allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = allow;
        self
    }

    /// Sets whether the retry policy is mounted.
    #[must_use]
    pub const fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the TLS policy.
    #[must_use]
    pub const fn with_tls(mut self, tls: TlsPolicy) -> Self {
        self.tls = tls;
        self
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Target URL, without the query parameters from `params`.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Target URL with `params` appended to its query string.
    #[must_use]
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        url
    }

    /// Scheme of the target URL (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Query parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Body variants.
    #[must_use]
    pub const fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Auth strategy, if any.
    #[must_use]
    pub const fn auth(&self) -> Option<&AuthConfig> {
        self.auth.as_ref()
    }

    /// Proxy map, if any.
    #[must_use]
    pub const fn proxy(&self) -> Option<&ProxyMap> {
        self.proxy.as_ref()
    }

    /// Per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether redirects are followed.
    #[must_use]
    pub const fn allow_redirects(&self) -> bool {
        self.allow_redirects
    }

    /// Whether the retry policy is mounted.
    #[must_use]
    pub const fn retry(&self) -> bool {
        self.retry
    }

    /// TLS verification policy.
    #[must_use]
    pub const fn tls(&self) -> TlsPolicy {
        self.tls
    }
}

/// Parses an absolute URL.
///
/// # Errors
///
/// Returns `InvalidUrl` if the input is empty or cannot be parsed.
pub fn parse_url(raw: &str) -> DomainResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidUrl("URL must not be empty".to_string()));
    }
    Url::parse(trimmed).map_err(|e| DomainError::InvalidUrl(format!("{e}: {trimmed}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_request() {
        let req = RequestSpec::parse(HttpMethod::Get, "https://api.example.com/users").unwrap();
        assert_eq!(req.method(), HttpMethod::Get);
        assert_eq!(req.url().as_str(), "https://api.example.com/users");
        assert_eq!(req.scheme(), "https");
        assert!(req.retry());
        assert!(!req.allow_redirects());
    }

    #[test]
    fn test_empty_url_is_rejected() {
        assert!(matches!(
            RequestSpec::parse(HttpMethod::Get, "  "),
            Err(DomainError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_relative_url_is_rejected() {
        assert!(matches!(
            RequestSpec::parse(HttpMethod::Get, "/posts/1"),
            Err(DomainError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_full_url_appends_params() {
        let req = RequestSpec::parse(HttpMethod::Get, "https://example.test/posts?page=1")
            .unwrap()
            .with_params(BTreeMap::from([("userId".to_string(), "3".to_string())]));
        assert_eq!(
            req.full_url().as_str(),
            "https://example.test/posts?page=1&userId=3"
        );
        assert_eq!(req.url().as_str(), "https://example.test/posts?page=1");
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let req = RequestSpec::parse(HttpMethod::Get, "https://example.test").unwrap();
        assert!(matches!(
            req.with_timeout(Duration::ZERO),
            Err(DomainError::InvalidTimeout(_))
        ));
    }
}
