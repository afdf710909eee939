//! Call configuration and its normalization into a [`RequestSpec`].
//!
//! [`RequestOptions`] is the caller-facing surface: every field except
//! `method` and `url` is optional. [`RequestOptions::normalize`] fills the
//! defaults, validates everything and produces a spec that can no longer be
//! invalid.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_domain::request::parse_url;
use verdict_domain::{
    AuthConfig, DomainError, DomainResult, FilePart, Headers, HttpMethod, ProxyMap, RequestBody,
    RequestSpec, TlsPolicy,
};

use crate::error::{ApplicationError, ApplicationResult};

/// Lower bound of the randomized default timeout, in seconds.
pub const RANDOM_TIMEOUT_MIN: f64 = 1.0;
/// Exclusive upper bound of the randomized default timeout, in seconds.
pub const RANDOM_TIMEOUT_MAX: f64 = 4.0;

/// Everything a caller may say about one HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// One of GET, PUT, POST, DELETE, PATCH (any casing).
    pub method: String,
    /// Absolute target URL.
    pub url: String,
    /// Replaces the default header set when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Query parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,
    /// Form fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BTreeMap<String, String>>,
    /// Multipart files keyed by field name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<BTreeMap<String, FilePart>>,
    /// JSON payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
    /// Auth strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
    /// Scheme to proxy URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<BTreeMap<String, String>>,
    /// Seconds; randomized in [1, 4) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
    /// Follow redirects (default false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_redirects: Option<bool>,
    /// Mount the retry policy (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<bool>,
    /// Verify certificates (default true).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
    /// Silence the unverified-TLS warning (default false).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suppress_warning: Option<bool>,
    /// Log to stdout (default true); otherwise to `verdict.log`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logger: Option<bool>,
    /// Fail the call on a 4xx or 5xx answer (default false).
    #[serde(default, alias = "event_hooks", skip_serializing_if = "Option::is_none")]
    pub raise_for_status: Option<bool>,
}

impl RequestOptions {
    /// Creates options with only the method and URL set.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: None,
            params: None,
            data: None,
            files: None,
            json: None,
            auth: None,
            proxy: None,
            timeout: None,
            allow_redirects: None,
            retry: None,
            verify: None,
            suppress_warning: None,
            logger: None,
            raise_for_status: None,
        }
    }

    /// Parses a call definition from YAML.
    ///
    /// # Errors
    ///
    /// Returns `Definition` if the document does not describe a call.
    pub fn from_yaml_str(source: &str) -> ApplicationResult<Self> {
        serde_yaml::from_str(source).map_err(|e| ApplicationError::Definition(e.to_string()))
    }

    /// Parses a call definition from JSON.
    ///
    /// # Errors
    ///
    /// Returns `Definition` if the document does not describe a call.
    pub fn from_json_str(source: &str) -> ApplicationResult<Self> {
        serde_json::from_str(source).map_err(|e| ApplicationError::Definition(e.to_string()))
    }

    /// Adds one header, starting from an empty set.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds one query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds one form field.
    #[must_use]
    pub fn data(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.data
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds a file read from disk.
    #[must_use]
    pub fn file(mut self, field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), FilePart::Path(path.into()));
        self
    }

    /// Adds an in-memory file part.
    #[must_use]
    pub fn file_part(mut self, field: impl Into<String>, part: FilePart) -> Self {
        self.files
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), part);
        self
    }

    /// Sets the JSON payload.
    #[must_use]
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.json = Some(value);
        self
    }

    /// Sets the auth strategy.
    #[must_use]
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets the proxy map.
    #[must_use]
    pub fn proxy<K: Into<String>, V: Into<String>>(
        mut self,
        proxies: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.proxy = Some(
            proxies
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Sets an explicit timeout in seconds.
    #[must_use]
    pub const fn timeout(mut self, seconds: f64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Sets whether redirects are followed.
    #[must_use]
    pub const fn allow_redirects(mut self, allow: bool) -> Self {
        self.allow_redirects = Some(allow);
        self
    }

    /// Sets whether the retry policy is mounted.
    #[must_use]
    pub const fn retry(mut self, retry: bool) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Sets certificate verification.
    #[must_use]
    pub const fn verify(mut self, verify: bool) -> Self {
        self.verify = Some(verify);
        self
    }

    /// Silences the unverified-TLS warning.
    #[must_use]
    pub const fn suppress_warning(mut self, suppress: bool) -> Self {
        self.suppress_warning = Some(suppress);
        self
    }

    /// Chooses the stdout sink (`true`) or the log file (`false`).
    #[must_use]
    pub const fn logger(mut self, enabled: bool) -> Self {
        self.logger = Some(enabled);
        self
    }

    /// Whether events go to stdout.
    #[must_use]
    pub fn logger_enabled(&self) -> bool {
        self.logger.unwrap_or(true)
    }

    /// Makes error statuses fail the call.
    #[must_use]
    pub const fn raise_for_status(mut self, raise: bool) -> Self {
        self.raise_for_status = Some(raise);
        self
    }

    /// Whether a 4xx or 5xx answer fails the call.
    #[must_use]
    pub fn raises_for_status(&self) -> bool {
        self.raise_for_status.unwrap_or(false)
    }

    /// Validates the options and fills every default.
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found; no spec is produced.
    pub fn normalize(&self) -> DomainResult<RequestSpec> {
        self.normalize_with_rng(&mut rand::rng())
    }

    /// Like [`RequestOptions::normalize`], drawing the default timeout from `rng`.
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found; no spec is produced.
    pub fn normalize_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> DomainResult<RequestSpec> {
        let method: HttpMethod = self.method.parse()?;
        let url = parse_url(&self.url)?;

        let proxy = self.proxy.clone().map(ProxyMap::new).transpose()?;

        if let Some(auth) = &self.auth {
            auth.validate()?;
        }

        let headers = match &self.headers {
            Some(given) => normalize_headers(given)?,
            None => Headers::defaults(),
        };

        let timeout = match self.timeout {
            Some(seconds) => explicit_timeout(seconds)?,
            None => random_timeout(rng),
        };

        let body = RequestBody {
            data: self.data.clone().unwrap_or_default(),
            files: self.files.clone().unwrap_or_default(),
            json: self
                .json
                .clone()
                .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
        };

        let tls = TlsPolicy {
            verify: self.verify.unwrap_or(true),
            suppress_warning: self.suppress_warning.unwrap_or(false),
        };

        debug!(
            method = %method,
            url = %url,
            timeout_secs = timeout.as_secs_f64(),
            body = ?body.kind(),
            "normalized call"
        );

        RequestSpec::new(method, url)
            .with_headers(headers)
            .with_params(self.params.clone().unwrap_or_default())
            .with_body(body)
            .with_auth(self.auth.clone())
            .with_proxy(proxy)
            .with_allow_redirects(self.allow_redirects.unwrap_or(false))
            .with_retry(self.retry.unwrap_or(true))
            .with_tls(tls)
            .with_timeout(timeout)
    }
}

/// Draws a timeout uniformly from [1, 4) seconds.
pub fn random_timeout<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_secs_f64(rng.random_range(RANDOM_TIMEOUT_MIN..RANDOM_TIMEOUT_MAX))
}

fn explicit_timeout(seconds: f64) -> DomainResult<Duration> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(DomainError::InvalidTimeout(format!(
            "timeout must be a positive number of seconds, got {seconds}"
        )));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| DomainError::InvalidTimeout(e.to_string()))
}

fn normalize_headers(given: &BTreeMap<String, String>) -> DomainResult<Headers> {
    for (name, value) in given {
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(DomainError::InvalidHeaderName(name.clone()));
        }
        if value.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0')) {
            return Err(DomainError::InvalidHeaderValue(format!("{name}: {value:?}")));
        }
    }
    Ok(given
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect())
}

/// RFC 7230 `tchar`.
const fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#'
                | b'$'
                | b'%'
                | b'&'
                | b'\''
                | b'*'
                | b'+'
                | b'-'
                | b'.'
                | b'^'
                | b'_'
                | b'`'
                | b'|'
                | b'~'
        )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;
    use verdict_domain::BodyKind;

    #[test]
    fn test_defaults() {
        let spec = RequestOptions::new("get", "https://example.test/posts/1")
            .normalize()
            .unwrap();

        assert_eq!(spec.method(), HttpMethod::Get);
        assert_eq!(spec.headers(), &Headers::defaults());
        assert!(spec.params().is_empty());
        assert_eq!(spec.body().kind(), BodyKind::None);
        assert_eq!(spec.body().json, json!({}));
        assert!(spec.retry());
        assert!(!spec.allow_redirects());
        assert!(spec.tls().verify);
        assert!(!spec.tls().suppress_warning);
        assert!(spec.proxy().is_none());
        assert!(spec.auth().is_none());
    }

    #[test]
    fn test_caller_headers_replace_defaults() {
        let spec = RequestOptions::new("GET", "https://example.test")
            .header("X-Trace", "abc")
            .normalize()
            .unwrap();
        assert_eq!(spec.headers().len(), 1);
        assert_eq!(spec.headers().get("x-trace"), Some("abc"));
        assert!(!spec.headers().contains("User-Agent"));
    }

    #[test]
    fn test_unsupported_method_fails() {
        for verb in ["HEAD", "options", "trace", "CONNECT", ""] {
            let result = RequestOptions::new(verb, "https://example.test").normalize();
            assert_eq!(
                result,
                Err(DomainError::UnsupportedMethod(verb.to_uppercase()))
            );
        }
    }

    #[test]
    fn test_empty_url_fails() {
        let result = RequestOptions::new("GET", "").normalize();
        assert!(matches!(result, Err(DomainError::InvalidUrl(_))));
    }

    #[test]
    fn test_proxy_without_https_fails_for_any_target() {
        for target in ["https://example.test", "http://example.test"] {
            let result = RequestOptions::new("GET", target)
                .proxy([("http", "http://proxy.local:3128")])
                .normalize();
            assert_eq!(result, Err(DomainError::ProxyRequiresHttps));
        }
    }

    #[test]
    fn test_proxy_with_https_is_kept() {
        let spec = RequestOptions::new("GET", "https://example.test")
            .proxy([("https", "http://proxy.local:3128")])
            .normalize()
            .unwrap();
        assert_eq!(spec.proxy().map(ProxyMap::len), Some(1));
    }

    #[test]
    fn test_default_timeout_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = Vec::with_capacity(1000);
        for _ in 0..1000 {
            let spec = RequestOptions::new("GET", "https://example.test")
                .normalize_with_rng(&mut rng)
                .unwrap();
            let secs = spec.timeout().as_secs_f64();
            assert!((RANDOM_TIMEOUT_MIN..RANDOM_TIMEOUT_MAX).contains(&secs), "{secs}");
            seen.push(secs);
        }
        let first = seen[0];
        assert!(seen.iter().any(|s| (s - first).abs() > f64::EPSILON));
    }

    #[test]
    fn test_explicit_timeout() {
        let spec = RequestOptions::new("GET", "https://example.test")
            .timeout(2.5)
            .normalize()
            .unwrap();
        assert_eq!(spec.timeout(), Duration::from_millis(2500));

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = RequestOptions::new("GET", "https://example.test")
                .timeout(bad)
                .normalize();
            assert!(matches!(result, Err(DomainError::InvalidTimeout(_))), "{bad}");
        }
    }

    #[test]
    fn test_empty_bearer_token_fails() {
        let mut options = RequestOptions::new("GET", "https://example.test");
        options.auth = Some(AuthConfig::Bearer {
            token: String::new(),
        });
        assert!(matches!(options.normalize(), Err(DomainError::InvalidAuth(_))));
    }

    #[test]
    fn test_invalid_header_name_fails() {
        let result = RequestOptions::new("GET", "https://example.test")
            .header("Bad Header", "x")
            .normalize();
        assert_eq!(
            result,
            Err(DomainError::InvalidHeaderName("Bad Header".to_string()))
        );

        let result = RequestOptions::new("GET", "https://example.test")
            .header("X-Ok", "line\r\nInjected: 1")
            .normalize();
        assert!(matches!(result, Err(DomainError::InvalidHeaderValue(_))));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let options = RequestOptions::new("post", "https://example.test/posts")
            .json(json!({"title": "foo", "userId": 1}))
            .param("draft", "true")
            .timeout(3.0);
        assert_eq!(options.normalize(), options.normalize());
    }

    #[test]
    fn test_body_precedence() {
        let spec = RequestOptions::new("POST", "https://example.test")
            .data("a", "1")
            .json(json!({"b": 2}))
            .normalize()
            .unwrap();
        assert_eq!(spec.body().kind(), BodyKind::Json);
    }

    #[test]
    fn test_from_yaml() {
        let options = RequestOptions::from_yaml_str(
            r"
method: post
url: https://example.test/posts
json:
  title: foo
  userId: 1
timeout: 2
auth:
  type: bearer
  token: abc
",
        )
        .unwrap();
        let spec = options.normalize().unwrap();
        assert_eq!(spec.method(), HttpMethod::Post);
        assert_eq!(spec.body().json, json!({"title": "foo", "userId": 1}));
        assert_eq!(spec.timeout(), Duration::from_secs(2));
        assert_eq!(spec.auth(), Some(&AuthConfig::bearer("abc").unwrap()));
    }

    #[test]
    fn test_from_json_requires_method_and_url() {
        let result = RequestOptions::from_json_str(r#"{"url": "https://example.test"}"#);
        assert!(matches!(result, Err(ApplicationError::Definition(_))));
    }

    #[test]
    fn test_logger_default() {
        let options = RequestOptions::new("GET", "https://example.test");
        assert!(options.logger_enabled());
        assert!(!options.logger(false).logger_enabled());
    }

    #[test]
    fn test_raise_for_status() {
        let options = RequestOptions::new("GET", "https://example.test");
        assert!(!options.raises_for_status());
        assert!(options.raise_for_status(true).raises_for_status());

        let options = RequestOptions::from_yaml_str(
            "method: get\nurl: https://example.test\nevent_hooks: true\n",
        )
        .unwrap();
        assert_eq!(options.raise_for_status, Some(true));
    }
}
