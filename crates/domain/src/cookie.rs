//! Cookies received in `Set-Cookie` response headers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single HTTP cookie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain the cookie belongs to.
    pub domain: String,
    /// Path the cookie applies to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration time (None for session cookies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
    /// HttpOnly flag.
    #[serde(default)]
    pub http_only: bool,
    /// Secure flag.
    #[serde(default)]
    pub secure: bool,
    /// SameSite attribute.
    #[serde(default)]
    pub same_site: SameSite,
}

fn default_path() -> String {
    "/".to_string()
}

impl Cookie {
    /// Create a new session cookie with path `/`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: default_path(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: SameSite::default(),
        }
    }

    /// Check if the cookie is expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|exp| exp < Utc::now())
    }

    /// Check if this is a session cookie (no expiration).
    #[must_use]
    pub const fn is_session(&self) -> bool {
        self.expires.is_none()
    }

    /// Parse from a `Set-Cookie` header value.
    ///
    /// `request_domain` is used when the header carries no `Domain` attribute.
    #[must_use]
    pub fn from_set_cookie(header: &str, request_domain: &str) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let mut cookie = Self::new(name, value.trim(), request_domain);

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let val = val.trim();
                match attr.trim().to_lowercase().as_str() {
                    "domain" => cookie.domain = val.trim_start_matches('.').to_string(),
                    "path" => cookie.path = val.to_string(),
                    "expires" => {
                        if let Ok(exp) = DateTime::parse_from_rfc2822(val) {
                            cookie.expires = Some(exp.with_timezone(&Utc));
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
                        }
                    }
                    "samesite" => cookie.same_site = SameSite::parse(val),
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "httponly" => cookie.http_only = true,
                    "secure" => cookie.secure = true,
                    _ => {}
                }
            }
        }

        Some(cookie)
    }
}

/// SameSite attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Cookies are sent with all requests.
    #[default]
    None,
    /// Cookies are sent with top-level navigations and GET from third-party sites.
    Lax,
    /// Cookies are only sent in first-party context.
    Strict,
}

impl SameSite {
    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "strict" => Self::Strict,
            "lax" => Self::Lax,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_set_cookie() {
        let cookie = Cookie::from_set_cookie(
            "session=abc123; Path=/api; Domain=.example.test; HttpOnly; Secure; SameSite=Strict",
            "fallback.test",
        )
        .unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "example.test");
        assert_eq!(cookie.path, "/api");
        assert!(cookie.http_only);
        assert!(cookie.secure);
        assert_eq!(cookie.same_site, SameSite::Strict);
        assert!(cookie.is_session());
    }

    #[test]
    fn test_request_domain_is_fallback() {
        let cookie = Cookie::from_set_cookie("id=7", "api.example.test").unwrap();
        assert_eq!(cookie.domain, "api.example.test");
        assert_eq!(cookie.path, "/");
    }

    #[test]
    fn test_expired_cookie() {
        let cookie =
            Cookie::from_set_cookie("gone=1; Expires=Thu, 01 Jan 1970 00:00:00 +0000", "x.test")
                .unwrap();
        assert!(cookie.is_expired());
        assert!(!cookie.is_session());
    }

    #[test]
    fn test_max_age() {
        let cookie = Cookie::from_set_cookie("keep=1; Max-Age=3600", "x.test").unwrap();
        assert!(!cookie.is_expired());
        assert!(!cookie.is_session());
    }

    #[test]
    fn test_malformed_header_is_ignored() {
        assert!(Cookie::from_set_cookie("no-equals-sign", "x.test").is_none());
        assert!(Cookie::from_set_cookie("=value", "x.test").is_none());
    }
}
