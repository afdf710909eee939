//! HTTP session implementation using the reqwest blocking client.
//!
//! This adapter implements the `HttpSession` port. One session belongs to one
//! call: it owns the pooled client, the retry mount for the target scheme and
//! the log of redirect hops observed while following.

use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Request, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, SET_COOKIE, WWW_AUTHENTICATE};
use reqwest::redirect::Policy;
use reqwest::{Certificate, Method, Proxy};
use tracing::{debug, info, warn};
use url::Url;
use verdict_application::{
    AttemptOutcome, HttpSession, RetryMount, RetryPolicy, SessionState, TransportError,
};
use verdict_domain::{
    CapturedResponse, Cookie, Headers, HttpMethod, ProxyMap, RedirectHop, RequestEcho,
    RequestSpec, TlsSecurityWarning,
};

use crate::auth::authenticator_for;
use crate::http::{BuiltBody, build_body};

/// Hop limit when following redirects.
const MAX_REDIRECTS: usize = 10;

/// PEM bundle merged into the root store when set.
const CERT_FILE_ENV: &str = "SSL_CERT_FILE";

type RedirectLog = Arc<Mutex<Vec<RedirectHop>>>;

/// HTTP session backed by `reqwest::blocking::Client`.
///
/// Built from a normalized [`RequestSpec`]: timeout, redirect policy, proxies
/// and certificate policy are fixed at open time.
pub struct ReqwestSession {
    client: Option<Client>,
    state: SessionState,
    retry: RetryPolicy,
    mount: Option<RetryMount>,
    redirects: RedirectLog,
    allow_redirects: bool,
    timeout: Duration,
}

impl ReqwestSession {
    /// Opens a session configured for `spec`.
    ///
    /// # Errors
    ///
    /// Returns `Tls` for an unreadable `SSL_CERT_FILE`, an unsupported target
    /// scheme or a client that cannot be built, and `Other` for a proxy URL
    /// the client rejects.
    pub fn open(spec: &RequestSpec) -> Result<Self, TransportError> {
        let method = spec.method();
        let url = spec.full_url();
        let redirects = RedirectLog::default();

        let mut builder = Client::builder()
            .timeout(spec.timeout())
            .redirect(redirect_policy(spec.allow_redirects(), Arc::clone(&redirects)));

        if let Some(proxies) = spec.proxy() {
            for proxy in build_proxies(proxies)
                .map_err(|e| map_error(&e, method, url.as_str(), spec.timeout()))?
            {
                builder = builder.proxy(proxy);
            }
        }

        let tls = spec.tls();
        if !tls.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        for warning in tls.security_warnings(spec.url()) {
            if warning == TlsSecurityWarning::CertificateVerificationDisabled {
                warn!(url = %spec.url(), "{}", warning.message());
            }
        }

        for certificate in ambient_certificates(method, &url)? {
            builder = builder.add_root_certificate(certificate);
        }

        let client = builder
            .build()
            .map_err(|e| map_error(&e, method, url.as_str(), spec.timeout()))?;

        let lifecycle = |e: verdict_application::InvalidTransition| TransportError::Other {
            method,
            url: url.to_string(),
            message: e.to_string(),
        };
        let opened = SessionState::default()
            .advance(SessionState::SessionOpen)
            .map_err(lifecycle)?;

        let (retry, mount, state) = if spec.retry() {
            let mount = RetryMount::for_url(spec.url()).map_err(|e| TransportError::Tls {
                method,
                url: url.to_string(),
                message: e.to_string(),
            })?;
            if mount.is_insecure() {
                warn!(
                    prefix = mount.prefix(),
                    "mounting retry adapter on unverified (HTTP) transport"
                );
            } else {
                debug!(prefix = mount.prefix(), "retry adapter mounted");
            }
            (
                RetryPolicy::standard(),
                Some(mount),
                opened.advance(SessionState::RetryMounted).map_err(lifecycle)?,
            )
        } else {
            info!("HTTP retry is turned off");
            (
                RetryPolicy::disabled(),
                None,
                opened.advance(SessionState::RetryDisabled).map_err(lifecycle)?,
            )
        };

        Ok(Self {
            client: Some(client),
            state,
            retry,
            mount,
            redirects,
            allow_redirects: spec.allow_redirects(),
            timeout: spec.timeout(),
        })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Post => Method::POST,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Patch => Method::PATCH,
        }
    }

    /// Builds the wire request: method, URL with params, headers and body.
    fn build_request(
        &self,
        client: &Client,
        spec: &RequestSpec,
        url: &Url,
        body: BuiltBody,
    ) -> Result<Request, TransportError> {
        let mut builder = client.request(Self::to_reqwest_method(spec.method()), url.clone());

        for header in spec.headers().iter() {
            builder = builder.header(&header.name, &header.value);
        }

        // Caller-set Content-Type wins
        if let Some(content_type) = body.content_type()
            && !spec.headers().contains("content-type")
        {
            builder = builder.header("Content-Type", content_type);
        }

        builder = match body {
            BuiltBody::None => builder,
            BuiltBody::Bytes { content, .. } => builder.body(content),
            BuiltBody::Multipart(form) => builder.multipart(form),
        };

        builder
            .build()
            .map_err(|e| map_error(&e, spec.method(), url.as_str(), self.timeout))
    }

    /// Sends under the retry policy; returns the final response and the
    /// instant its attempt was dispatched.
    fn dispatch(
        &self,
        client: &Client,
        request: Request,
        method: HttpMethod,
        url: &Url,
    ) -> Result<(Response, Instant), TransportError> {
        let retry_enabled = self.mount.is_some_and(|m| m.matches(request.url()));
        let mut request = request;
        let mut attempt = 1;

        loop {
            // Streamed multipart bodies cannot be cloned and go out once
            let spare = if retry_enabled {
                request.try_clone()
            } else {
                None
            };
            self.clear_redirects();

            let started = Instant::now();
            let result = client
                .execute(request)
                .map_err(|e| map_error(&e, method, url.as_str(), self.timeout));
            let outcome = match &result {
                Ok(response) => AttemptOutcome::Status(response.status().as_u16()),
                Err(error) => AttemptOutcome::Failed(error),
            };

            match spare {
                Some(next) if self.retry.should_retry(method, attempt, outcome) => {
                    let delay = self.retry.backoff_for_retry(attempt);
                    warn!(
                        attempt,
                        delay_secs = delay.as_secs_f64(),
                        "retrying {method} {url}"
                    );
                    thread::sleep(delay);
                    request = next;
                    attempt += 1;
                }
                _ => return result.map(|response| (response, started)),
            }
        }
    }

    fn clear_redirects(&self) {
        if let Ok(mut hops) = self.redirects.lock() {
            hops.clear();
        }
    }

    fn redirect_history(&self) -> Vec<RedirectHop> {
        self.redirects
            .lock()
            .map(|hops| hops.clone())
            .unwrap_or_default()
    }

    /// Reads the full body and records everything about the response.
    fn capture(
        &self,
        response: Response,
        started: Instant,
        echo: RequestEcho,
    ) -> Result<CapturedResponse, TransportError> {
        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = collect_headers(response.headers());

        let domain = final_url.host_str().unwrap_or_default().to_string();
        let cookies: Vec<Cookie> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| Cookie::from_set_cookie(value, &domain))
            .collect();

        let body = response
            .bytes()
            .map_err(|e| map_error(&e, echo.method, echo.url.as_str(), self.timeout))?
            .to_vec();
        let elapsed = started.elapsed();

        debug!(
            status,
            bytes = body.len(),
            elapsed_secs = elapsed.as_secs_f64(),
            "response captured"
        );

        Ok(CapturedResponse::new(status, headers, body, elapsed, echo)
            .with_final_url(final_url)
            .with_history(self.redirect_history(), self.allow_redirects)
            .with_cookies(cookies))
    }
}

impl HttpSession for ReqwestSession {
    fn send(&mut self, request: &RequestSpec) -> Result<CapturedResponse, TransportError> {
        let method = request.method();
        let url = request.full_url();

        let Some(client) = self.client.as_ref() else {
            return Err(TransportError::SessionClosed {
                method,
                url: url.to_string(),
            });
        };
        let sent = self
            .state
            .advance(SessionState::Sent)
            .map_err(|e| TransportError::Other {
                method,
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let body = build_body(request.body()).map_err(|e| TransportError::InvalidBody {
            method,
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let echo_body = body.echo();
        let mut wire = self.build_request(client, request, &url, body)?;

        let authenticator = request.auth().map(authenticator_for);
        if let Some(auth) = &authenticator {
            wire = auth.mutate(wire)?;
            debug!(auth = request.auth().map(|a| a.kind()), "credentials applied");
        }

        let mut echo = RequestEcho {
            method,
            url: wire.url().clone(),
            headers: collect_headers(wire.headers()),
            body: echo_body,
        };
        let challenge_copy = authenticator
            .as_ref()
            .filter(|auth| auth.expects_challenge())
            .and_then(|_| wire.try_clone());

        let (mut response, mut started) = self.dispatch(client, wire, method, &url)?;

        if let (Some(auth), Some(mut retry_request)) = (&authenticator, challenge_copy)
            && response.status().as_u16() == 401
            && let Some(answer) = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|value| value.to_str().ok())
                .and_then(|challenge| auth.challenge(&retry_request, challenge))
        {
            let value = HeaderValue::from_str(&answer).map_err(|e| TransportError::Other {
                method,
                url: url.to_string(),
                message: format!("invalid digest authorization: {e}"),
            })?;
            retry_request.headers_mut().insert(AUTHORIZATION, value);
            echo.headers.insert("authorization", answer);
            debug!("answering digest challenge");
            (response, started) = self.dispatch(client, retry_request, method, &url)?;
        }

        let captured = self.capture(response, started, echo)?;
        self.state = sent;
        Ok(captured)
    }

    fn close(&mut self) {
        if !self.state.is_closed() {
            self.client = None;
            self.state = SessionState::Closed;
            debug!("session closed");
        }
    }

    fn state(&self) -> SessionState {
        self.state
    }
}

impl Drop for ReqwestSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Records every hop while following; never follows when disabled.
fn redirect_policy(follow: bool, log: RedirectLog) -> Policy {
    if !follow {
        return Policy::none();
    }
    Policy::custom(move |attempt| {
        if let (Some(previous), Ok(mut hops)) = (attempt.previous().last(), log.lock()) {
            hops.push(RedirectHop {
                status: attempt.status().as_u16().into(),
                url: previous.clone(),
            });
        }
        if attempt.previous().len() > MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else {
            attempt.follow()
        }
    })
}

/// Scheme-specific proxies first so `all` only catches the rest.
fn build_proxies(proxies: &ProxyMap) -> Result<Vec<Proxy>, reqwest::Error> {
    let mut built = Vec::with_capacity(proxies.len());
    let mut fallback = None;
    for (key, url) in proxies.iter() {
        match key {
            "http" => built.push(Proxy::http(url.as_str())?),
            "https" => built.push(Proxy::https(url.as_str())?),
            _ => fallback = Some(Proxy::all(url.as_str())?),
        }
    }
    built.extend(fallback);
    Ok(built)
}

/// Root certificates from `SSL_CERT_FILE`, if set.
fn ambient_certificates(method: HttpMethod, url: &Url) -> Result<Vec<Certificate>, TransportError> {
    let Some(path) = std::env::var_os(CERT_FILE_ENV) else {
        return Ok(Vec::new());
    };
    let tls_error = |message: String| TransportError::Tls {
        method,
        url: url.to_string(),
        message,
    };

    let pem = std::fs::read(&path).map_err(|e| {
        tls_error(format!("cannot read {CERT_FILE_ENV} {}: {e}", path.to_string_lossy()))
    })?;
    let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| tls_error(e.to_string()))?;
    debug!(count = certificates.len(), "loaded root certificates from {CERT_FILE_ENV}");
    Ok(certificates)
}

/// Joins repeated header values with ", ".
fn collect_headers(map: &HeaderMap) -> Headers {
    map.keys()
        .map(|name| {
            let values: Vec<&str> = map
                .get_all(name)
                .iter()
                .map(|v| v.to_str().unwrap_or("<binary>"))
                .collect();
            (name.as_str(), values.join(", "))
        })
        .collect()
}

/// Full error text including the source chain.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let cause = source_chain(error);
    if !cause.is_empty() {
        message.push_str(": ");
        message.push_str(&cause);
    }
    message
}

/// Text of the sources only. reqwest's own message embeds the request URL.
fn source_chain(error: &reqwest::Error) -> String {
    let mut parts = Vec::new();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

/// Kind of the first `io::Error` in the source chain.
fn io_error_kind(error: &reqwest::Error) -> Option<io::ErrorKind> {
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        if let Some(io_error) = inner.downcast_ref::<io::Error>() {
            return Some(io_error.kind());
        }
        source = inner.source();
    }
    None
}

/// Maps reqwest errors to the transport failure classes.
///
/// Socket-level `io::Error` kinds decide first. rustls reports handshake and
/// certificate failures as `InvalidData`.
fn map_error(
    error: &reqwest::Error,
    method: HttpMethod,
    url: &str,
    timeout: Duration,
) -> TransportError {
    let url = url.to_string();
    if error.is_timeout() {
        return TransportError::Timeout {
            method,
            url,
            timeout_secs: timeout.as_secs_f64(),
        };
    }

    let message = error_chain(error);
    if error.is_decode() {
        return TransportError::Decode {
            method,
            url,
            message,
        };
    }

    match io_error_kind(error) {
        Some(
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof,
        ) => {
            return TransportError::Connection {
                method,
                url,
                message,
            };
        }
        Some(io::ErrorKind::InvalidData) if error.is_connect() => {
            return TransportError::Tls {
                method,
                url,
                message,
            };
        }
        _ => {}
    }

    let cause = source_chain(error).to_lowercase();
    let tls_failure = cause.contains("certificate")
        || cause.contains("tls")
        || cause.contains("handshake")
        || (error.is_builder() && cause.contains("scheme"));
    if tls_failure {
        return TransportError::Tls {
            method,
            url,
            message,
        };
    }

    if error.is_connect() || cause.contains("dns") {
        return TransportError::Connection {
            method,
            url,
            message,
        };
    }

    TransportError::Other {
        method,
        url,
        message,
    }
}
