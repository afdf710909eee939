//! HTTP proxy configuration.
//!
//! A proxy map associates a target scheme (`http`, `https` or `all`) with the
//! URL of the proxy server that carries that traffic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Schemes a proxy server itself may be reached over.
const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Keys a proxy map may use.
const TARGET_KEYS: &[&str] = &["http", "https", "all"];

/// Validated mapping of target scheme to proxy URL.
///
/// Any map, including an empty one, must carry an `https` entry, whatever
/// scheme the call targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ProxyMap {
    entries: BTreeMap<String, Url>,
}

impl ProxyMap {
    /// Validates and builds a proxy map.
    ///
    /// # Errors
    ///
    /// Returns `ProxyRequiresHttps` if there is no `https` key, and
    /// `InvalidProxy` for an unknown key or a malformed proxy URL.
    pub fn new(raw: BTreeMap<String, String>) -> DomainResult<Self> {
        if !raw.contains_key("https") {
            return Err(DomainError::ProxyRequiresHttps);
        }

        let mut entries = BTreeMap::new();
        for (scheme, value) in raw {
            if !TARGET_KEYS.contains(&scheme.as_str()) {
                return Err(DomainError::InvalidProxy {
                    scheme,
                    reason: "key must be one of http, https, all".to_string(),
                });
            }
            let url = Url::parse(value.trim()).map_err(|e| DomainError::InvalidProxy {
                scheme: scheme.clone(),
                reason: e.to_string(),
            })?;
            if !PROXY_SCHEMES.contains(&url.scheme()) {
                return Err(DomainError::InvalidProxy {
                    scheme,
                    reason: format!(
                        "proxy URL must start with http://, https://, socks5:// \
                         or socks5h://, got {}://",
                        url.scheme()
                    ),
                });
            }
            if url.host_str().is_none_or(str::is_empty) {
                return Err(DomainError::InvalidProxy {
                    scheme,
                    reason: "proxy URL has no host".to_string(),
                });
            }
            entries.insert(scheme, url);
        }

        Ok(Self { entries })
    }

    /// Proxy URL for a target scheme, falling back to the `all` entry.
    #[must_use]
    pub fn for_scheme(&self, scheme: &str) -> Option<&Url> {
        self.entries.get(scheme).or_else(|| self.entries.get("all"))
    }

    /// Iterates over `(key, proxy URL)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Url)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for ProxyMap {
    type Error = DomainError;

    fn try_from(raw: BTreeMap<String, String>) -> DomainResult<Self> {
        Self::new(raw)
    }
}

impl From<ProxyMap> for BTreeMap<String, String> {
    fn from(map: ProxyMap) -> Self {
        map.entries
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect()
    }
}
