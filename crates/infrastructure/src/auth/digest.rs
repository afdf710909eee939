//! HTTP digest authentication (RFC 2617 / RFC 7616, MD5 family).

use rand::Rng;
use reqwest::blocking::Request;
use verdict_application::TransportError;

use super::authenticator::Authenticator;

/// Parsed `WWW-Authenticate: Digest ...` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    /// Protection space.
    pub realm: String,
    /// Server nonce.
    pub nonce: String,
    /// `MD5` unless the server says otherwise.
    pub algorithm: String,
    /// Opaque value echoed back verbatim.
    pub opaque: Option<String>,
    /// Offered quality-of-protection values.
    pub qop: Option<String>,
}

impl DigestChallenge {
    /// Parses a challenge header; `None` for non-digest schemes or a
    /// challenge missing `realm` or `nonce`.
    #[must_use]
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (scheme, params) = header.split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("digest") {
            return None;
        }

        let mut realm = None;
        let mut nonce = None;
        let mut algorithm = "MD5".to_string();
        let mut opaque = None;
        let mut qop = None;

        for part in split_params(params) {
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            let value = unquote(value.trim());
            match key.trim().to_lowercase().as_str() {
                "realm" => realm = Some(value),
                "nonce" => nonce = Some(value),
                "algorithm" => algorithm = value,
                "opaque" => opaque = Some(value),
                "qop" => qop = Some(value),
                _ => {}
            }
        }

        Some(Self {
            realm: realm?,
            nonce: nonce?,
            algorithm,
            opaque,
            qop,
        })
    }

    /// Returns true if the server accepts `qop=auth`.
    #[must_use]
    pub fn offers_auth_qop(&self) -> bool {
        self.qop
            .as_deref()
            .is_some_and(|q| q.split(',').any(|v| v.trim() == "auth"))
    }

    fn is_session_variant(&self) -> bool {
        self.algorithm.to_uppercase().ends_with("-SESS")
    }

    fn is_supported(&self) -> bool {
        matches!(self.algorithm.to_uppercase().as_str(), "MD5" | "MD5-SESS")
    }
}

/// Splits `a="x, y", b=z` on commas outside quotes.
fn split_params(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, ch) in params.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(params[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(params[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn md5_hex(data: &str) -> String {
    format!("{:x}", md5::compute(data.as_bytes()))
}

/// Digest credentials. Sends unauthenticated, then answers one challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestAuthenticator {
    username: String,
    password: String,
}

impl DigestAuthenticator {
    /// Creates the authenticator.
    #[must_use]
    pub const fn new(username: String, password: String) -> Self {
        Self { username, password }
    }

    /// Builds the `Authorization` header value for one request.
    ///
    /// `nc` is fixed at 1 since each challenge is answered exactly once.
    #[must_use]
    pub fn authorization(
        &self,
        challenge: &DigestChallenge,
        method: &str,
        uri: &str,
        cnonce: &str,
    ) -> String {
        let nc = "00000001";
        let mut ha1 = md5_hex(&format!("{}:{}:{}", self.username, challenge.realm, self.password));
        if challenge.is_session_variant() {
            ha1 = md5_hex(&format!("{ha1}:{}:{cnonce}", challenge.nonce));
        }
        let ha2 = md5_hex(&format!("{method}:{uri}"));

        let use_qop = challenge.offers_auth_qop();
        let response = if use_qop {
            md5_hex(&format!("{ha1}:{}:{nc}:{cnonce}:auth:{ha2}", challenge.nonce))
        } else {
            md5_hex(&format!("{ha1}:{}:{ha2}", challenge.nonce))
        };

        let mut parts = vec![
            format!("username=\"{}\"", self.username),
            format!("realm=\"{}\"", challenge.realm),
            format!("nonce=\"{}\"", challenge.nonce),
            format!("uri=\"{uri}\""),
            format!("response=\"{response}\""),
            format!("algorithm={}", challenge.algorithm),
        ];
        if let Some(opaque) = &challenge.opaque {
            parts.push(format!("opaque=\"{opaque}\""));
        }
        if use_qop {
            parts.push("qop=auth".to_string());
            parts.push(format!("nc={nc}"));
            parts.push(format!("cnonce=\"{cnonce}\""));
        }

        format!("Digest {}", parts.join(", "))
    }
}

impl Authenticator for DigestAuthenticator {
    fn mutate(&self, request: Request) -> Result<Request, TransportError> {
        Ok(request)
    }

    fn expects_challenge(&self) -> bool {
        true
    }

    fn challenge(&self, request: &Request, www_authenticate: &str) -> Option<String> {
        let challenge = DigestChallenge::parse(www_authenticate)?;
        if !challenge.is_supported() {
            return None;
        }

        let url = request.url();
        let uri = url
            .query()
            .map_or_else(|| url.path().to_string(), |q| format!("{}?{q}", url.path()));
        let cnonce = format!("{:016x}", rand::rng().random::<u64>());

        Some(self.authorization(&challenge, request.method().as_str(), &uri, &cnonce))
    }
}
