//! HTTP Header types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Version string advertised in the default `User-Agent`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A single HTTP header with name and value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Content-Type")
    pub name: String,
    /// The header value (e.g., "application/json")
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered, case-insensitive collection of HTTP headers.
///
/// Inserting a name that already exists (in any casing) replaces the value and
/// keeps the original position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Headers {
    items: Vec<Header>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The header set used when a caller supplies none.
    #[must_use]
    pub fn defaults() -> Self {
        [
            ("User-Agent", format!("verdict, {VERSION}")),
            ("Accept", "*/*".to_string()),
            ("Connection", "keep-alive".to_string()),
        ]
        .into_iter()
        .collect()
    }

    /// Sets a header, replacing any existing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|h| h.name.eq_ignore_ascii_case(&name))
        {
            existing.value = value;
        } else {
            self.items.push(Header { name, value });
        }
    }

    /// Gets a header value by name (case-insensitive).
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Returns true if the header is present (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes a header by name, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self
            .items
            .iter()
            .position(|h| h.name.eq_ignore_ascii_case(name))?;
        Some(self.items.remove(index).value)
    }

    /// Returns an iterator over all headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.items.iter()
    }

    /// Returns the number of headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no headers.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Order-irrelevant, case-insensitive comparison.
impl PartialEq for Headers {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .items
                .iter()
                .all(|h| other.get(&h.name) == Some(h.value.as_str()))
    }
}

impl Eq for Headers {}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl From<BTreeMap<String, String>> for Headers {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Headers> for BTreeMap<String, String> {
    fn from(headers: Headers) -> Self {
        headers
            .items
            .into_iter()
            .map(|h| (h.name, h.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_headers() {
        let headers = Headers::defaults();
        assert_eq!(headers.len(), 3);
        assert_eq!(headers.get("accept"), Some("*/*"));
        assert_eq!(headers.get("CONNECTION"), Some("keep-alive"));
        assert!(headers
            .get("user-agent")
            .is_some_and(|ua| ua.starts_with("verdict, ")));
    }

    #[test]
    fn test_insert_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("content-type", "application/json");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(headers.iter().next().map(|h| h.name.as_str()), Some("Content-Type"));
    }

    #[test]
    fn test_remove() {
        let mut headers: Headers = [("X-One", "1"), ("X-Two", "2")].into_iter().collect();
        assert_eq!(headers.remove("x-one"), Some("1".to_string()));
        assert_eq!(headers.remove("x-one"), None);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_equality_ignores_order_and_case() {
        let a: Headers = [("Accept", "*/*"), ("X-Id", "7")].into_iter().collect();
        let b: Headers = [("x-id", "7"), ("accept", "*/*")].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_deserialize_from_mapping() {
        let headers: Headers =
            serde_json::from_str(r#"{"Accept": "application/json", "X-Trace": "abc"}"#)
                .unwrap_or_default();
        assert_eq!(headers.get("x-trace"), Some("abc"));
        assert_eq!(headers.len(), 2);
    }
}
