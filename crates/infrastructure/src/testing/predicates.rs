//! Assertion predicates evaluated against a captured response.
//!
//! Every predicate borrows the response, never mutates it, and returns the
//! caller's message on success or an [`AssertionFailure`] describing what was
//! observed.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::warn;
use verdict_domain::{
    AssertionFailure, AssertionOutcome, CapturedResponse, DomainResult, TransportSecurity,
};

use super::html::{absolute_links, select_text};
use crate::serialization::normalize_json;

/// Default ceiling for [`Assertions::assert_response_time_less`], in seconds.
pub const RESPONSE_TIME_CEILING_SECS: f64 = 200.0;

/// Statuses [`Assertions::assert_expected_to_fail`] treats as success.
const SUCCESS_STATUSES: [u16; 2] = [200, 201];

const PREVIEW_LEN: usize = 100;

fn check(
    passed: bool,
    message: &str,
    failure: impl FnOnce() -> AssertionFailure,
) -> AssertionOutcome {
    if passed {
        Ok(message.to_string())
    } else {
        Err(failure())
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_LEN {
        format!("{}...", text.chars().take(PREVIEW_LEN).collect::<String>())
    } else {
        text.to_string()
    }
}

fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Predicates over one captured response.
#[derive(Debug, Clone, Copy)]
pub struct Assertions<'a> {
    response: &'a CapturedResponse,
}

impl<'a> Assertions<'a> {
    /// Borrows a response.
    #[must_use]
    pub const fn new(response: &'a CapturedResponse) -> Self {
        Self { response }
    }

    /// The response under test.
    #[must_use]
    pub const fn response(&self) -> &'a CapturedResponse {
        self.response
    }

    const fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    fn status_in_range(
        &self,
        low: u16,
        high: u16,
        failure: &str,
        message: &str,
    ) -> AssertionOutcome {
        let status = self.status();
        check((low..high).contains(&status), message, || {
            AssertionFailure::new(failure, status.to_string()).expected(format!("[{low}, {high})"))
        })
    }

    /// Parses the body, failing with a readable message instead of a decode
    /// error.
    fn json_body(&self) -> Result<Value, AssertionFailure> {
        self.response.json().map_err(|e| {
            AssertionFailure::new(
                format!("The response body is not valid JSON: {e}"),
                preview(self.response.text()),
            )
        })
    }

    /// Status is 200.
    ///
    /// # Errors
    ///
    /// Fails with "The request didn't success" otherwise.
    pub fn assert_is_ok(&self, message: &str) -> AssertionOutcome {
        let status = self.status();
        check(status == 200, message, || {
            AssertionFailure::new("The request didn't success", status.to_string()).expected("200")
        })
    }

    /// Status is anything but 200.
    ///
    /// # Errors
    ///
    /// Fails with "The request should be failed" on 200.
    pub fn assert_is_failed(&self, message: &str) -> AssertionOutcome {
        let status = self.status();
        check(status != 200, message, || {
            AssertionFailure::new("The request should be failed", status.to_string())
                .expected("not 200")
        })
    }

    /// Status in `[200, 300)`.
    ///
    /// # Errors
    ///
    /// Fails outside the range.
    pub fn assert_is_2xx_status(&self, message: &str) -> AssertionOutcome {
        self.status_in_range(200, 300, "The status not 2xx", message)
    }

    /// Status in `[300, 400)`.
    ///
    /// # Errors
    ///
    /// Fails outside the range.
    pub fn assert_is_3xx_status(&self, message: &str) -> AssertionOutcome {
        self.status_in_range(300, 400, "The status not 3xx", message)
    }

    /// Status in `[400, 500)`.
    ///
    /// # Errors
    ///
    /// Fails outside the range.
    pub fn assert_is_4xx_status(&self, message: &str) -> AssertionOutcome {
        self.status_in_range(400, 500, "The status not 4xx", message)
    }

    /// Status in `[500, 600)`.
    ///
    /// # Errors
    ///
    /// Fails outside the range.
    pub fn assert_is_5xx_status(&self, message: &str) -> AssertionOutcome {
        self.status_in_range(500, 600, "The status not 5xx", message)
    }

    /// At least one response header.
    ///
    /// # Errors
    ///
    /// Fails when the response carries no headers.
    pub fn assert_has_headers(&self, message: &str) -> AssertionOutcome {
        let headers = self.response.headers();
        check(!headers.is_empty(), message, || {
            AssertionFailure::new("There's no headers in that request", "0 headers")
        })
    }

    /// Non-empty body bytes.
    ///
    /// # Errors
    ///
    /// Fails on an empty body.
    pub fn assert_has_content(&self, message: &str) -> AssertionOutcome {
        check(!self.response.bytes().is_empty(), message, || {
            AssertionFailure::new("There's no content in the body", "0 bytes")
        })
    }

    /// Body parses as JSON and is not empty.
    ///
    /// # Errors
    ///
    /// Fails when the body is not JSON or is an empty JSON value.
    pub fn assert_has_json(&self, message: &str) -> AssertionOutcome {
        let value = self.json_body()?;
        check(!is_empty_json(&value), message, || {
            AssertionFailure::new("The request has no JSON object", value.to_string())
        })
    }

    /// Non-empty decoded text.
    ///
    /// # Errors
    ///
    /// Fails on an empty body.
    pub fn assert_has_text(&self, message: &str) -> AssertionOutcome {
        check(!self.response.text().is_empty(), message, || {
            AssertionFailure::new("The request has no text object", "")
        })
    }

    /// `Content-Type` present and non-empty.
    ///
    /// # Errors
    ///
    /// Fails when the header is missing or blank.
    pub fn assert_has_content_type(&self, message: &str) -> AssertionOutcome {
        let content_type = self.response.content_type().unwrap_or_default();
        check(!content_type.trim().is_empty(), message, || {
            AssertionFailure::new("Perhaps 'content-type' wasn't set", content_type)
        })
    }

    /// `Content-Type` equals `expected` exactly.
    ///
    /// # Errors
    ///
    /// Fails on any difference, including a missing header.
    pub fn assert_content_type_to_equal(&self, expected: &str, message: &str) -> AssertionOutcome {
        let actual = self.response.content_type();
        check(actual == Some(expected), message, || {
            AssertionFailure::new(
                "The value of content-type doesn't match with the actual result",
                actual.unwrap_or("<missing>"),
            )
            .expected(expected)
        })
    }

    /// Status is one of `codes`.
    ///
    /// # Errors
    ///
    /// Fails when the status is not listed.
    pub fn assert_status_code_in(&self, codes: &[u16], message: &str) -> AssertionOutcome {
        let actual = self.status().to_string();
        let listed = codes.iter().any(|code| code.to_string() == actual);
        check(listed, message, || {
            AssertionFailure::new(
                "The expected status code didn't match with actual result",
                actual.clone(),
            )
            .expected(format!("{codes:?}"))
        })
    }

    /// Status is none of `codes`.
    ///
    /// # Errors
    ///
    /// Fails when the status is listed.
    pub fn assert_status_code_not_in(&self, codes: &[u16], message: &str) -> AssertionOutcome {
        let actual = self.status().to_string();
        let listed = codes.iter().any(|code| code.to_string() == actual);
        check(!listed, message, || {
            AssertionFailure::new(
                "The expected status code (actually) did matched with actual result",
                actual.clone(),
            )
            .expected(format!("not in {codes:?}"))
        })
    }

    /// JSON body equals `expected`, ignoring object key order.
    ///
    /// # Errors
    ///
    /// Fails when the body is not JSON or differs.
    pub fn assert_json_to_equal(&self, expected: &Value, message: &str) -> AssertionOutcome {
        let actual = self.json_body()?;
        let normalize = |value: &Value| normalize_json(value).unwrap_or_else(|_| value.clone());
        check(normalize(&actual) == normalize(expected), message, || {
            AssertionFailure::new("There's no object that match", actual.to_string())
                .expected(expected.to_string())
        })
    }

    /// JSON body is an object equal to `expected`.
    ///
    /// # Errors
    ///
    /// Fails when the body is not a JSON object or differs.
    pub fn assert_dict_to_equal(
        &self,
        expected: &serde_json::Map<String, Value>,
        message: &str,
    ) -> AssertionOutcome {
        let actual = self.json_body()?;
        let Value::Object(object) = &actual else {
            return Err(AssertionFailure::new(
                "The response body is not a JSON object",
                preview(&actual.to_string()),
            ));
        };
        check(object == expected, message, || {
            AssertionFailure::new("There's no dict object that match", actual.to_string())
                .expected(Value::Object(expected.clone()).to_string())
        })
    }

    /// Decoded text equals `expected`.
    ///
    /// # Errors
    ///
    /// Fails on any difference.
    pub fn assert_text_to_equal(&self, expected: &str, message: &str) -> AssertionOutcome {
        let actual = self.response.text();
        check(actual == expected, message, || {
            AssertionFailure::new("There's no (text) object that match", preview(actual))
                .expected(preview(expected))
        })
    }

    /// Raw bytes equal `expected`.
    ///
    /// # Errors
    ///
    /// Fails on any difference.
    pub fn assert_content_to_equal(&self, expected: &[u8], message: &str) -> AssertionOutcome {
        let actual = self.response.bytes();
        check(actual == expected, message, || {
            AssertionFailure::new(
                "There's no content that match",
                format!("{} bytes", actual.len()),
            )
            .expected(format!("{} bytes", expected.len()))
        })
    }

    /// Elapsed time is at most `max_secs` seconds.
    ///
    /// # Errors
    ///
    /// Fails when the call took longer.
    pub fn assert_response_time(&self, max_secs: f64, message: &str) -> AssertionOutcome {
        let elapsed = self.response.elapsed_secs();
        check(elapsed <= max_secs, message, || {
            AssertionFailure::new("The duration exceeds the limit", format!("{elapsed:.3}s"))
                .expected(format!("<= {max_secs}s"))
        })
    }

    /// Elapsed time is within [`RESPONSE_TIME_CEILING_SECS`].
    ///
    /// # Errors
    ///
    /// Fails when the call took longer.
    pub fn assert_response_time_less(&self, message: &str) -> AssertionOutcome {
        self.assert_response_time(RESPONSE_TIME_CEILING_SECS, message)
    }

    /// Status is neither 200 nor 201.
    ///
    /// # Errors
    ///
    /// Fails on a success status.
    pub fn assert_expected_to_fail(&self, message: &str) -> AssertionOutcome {
        let status = self.status();
        check(!SUCCESS_STATUSES.contains(&status), message, || {
            AssertionFailure::new("The request was expected to fail", status.to_string())
                .expected(format!("not in {SUCCESS_STATUSES:?}"))
        })
    }

    /// `Content-Length` present and non-zero.
    ///
    /// # Errors
    ///
    /// Fails when the header is missing, blank or zero.
    pub fn assert_content_length(&self, message: &str) -> AssertionOutcome {
        let value = self.response.header("content-length").map(str::trim);
        let truthy =
            value.is_some_and(|v| !v.is_empty() && v.parse::<u64>().map_or(true, |n| n > 0));
        check(truthy, message, || {
            AssertionFailure::new(
                "The response has no Content-Length",
                value.unwrap_or("<missing>"),
            )
        })
    }

    /// Passes for `https`; passes with an insecure note (and a warning log)
    /// for `http`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedScheme` for any other scheme.
    pub fn assert_tls_secure(&self, message: &str) -> DomainResult<AssertionOutcome> {
        let url = &self.response.request().url;
        match TransportSecurity::of(url)? {
            TransportSecurity::Secure => Ok(Ok(message.to_string())),
            TransportSecurity::Insecure => {
                warn!(url = %url, "request was sent over an unverified (HTTP) transport");
                Ok(Ok(format!("{message} (insecure: plain HTTP)")))
            }
        }
    }

    /// Text of the elements matching a CSS selector equals `expected`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid selector, an empty document or different text.
    pub fn assert_selector_to_equal(
        &self,
        selector: &str,
        expected: &[&str],
        message: &str,
    ) -> AssertionOutcome {
        let html = self.response.text();
        if html.trim().is_empty() {
            return Err(AssertionFailure::new("The response has no HTML document", ""));
        }
        let actual = select_text(html, selector)
            .map_err(|e| AssertionFailure::new(e.to_string(), selector))?;
        check(actual == expected, message, || {
            AssertionFailure::new(
                format!("The query result of '{selector}' doesn't match with expected data"),
                format!("{actual:?}"),
            )
            .expected(format!("{expected:?}"))
        })
    }

    /// Every absolute `http`/`https` link in the document is in `expected`.
    ///
    /// # Errors
    ///
    /// Fails on the first link outside the set.
    pub fn assert_links_in(&self, expected: &[&str], message: &str) -> AssertionOutcome {
        let allowed: BTreeSet<&str> = expected.iter().copied().collect();
        let links = absolute_links(self.response.text());
        match links.iter().find(|link| !allowed.contains(link.as_str())) {
            None => Ok(message.to_string()),
            Some(outsider) => Err(AssertionFailure::new(
                "Found a link outside the expected set",
                outsider.clone(),
            )
            .expected(format!("{expected:?}"))),
        }
    }

    /// Every key path exists in the JSON body. A path descends one key at a
    /// time, separated by dots (`data.id`).
    ///
    /// # Errors
    ///
    /// Fails when the body is not JSON or a key is missing.
    pub fn assert_keys_in_response(&self, keys: &[&str], message: &str) -> AssertionOutcome {
        let body = self.json_body()?;
        if !body.is_object() {
            return Err(AssertionFailure::new(
                "The response body is not a JSON object",
                preview(&body.to_string()),
            ));
        }

        for path in keys {
            let mut current = &body;
            for key in path.split('.') {
                current = current.get(key).ok_or_else(|| {
                    AssertionFailure::new(
                        format!("Key '{path}' not found in the JSON response"),
                        preview(&body.to_string()),
                    )
                    .expected(*path)
                })?;
            }
        }
        Ok(message.to_string())
    }

    /// Body is non-empty UTF-8 text.
    ///
    /// # Errors
    ///
    /// Fails on an empty or non-UTF-8 body.
    pub fn assert_is_text(&self, message: &str) -> AssertionOutcome {
        let bytes = self.response.bytes();
        check(!bytes.is_empty() && std::str::from_utf8(bytes).is_ok(), message, || {
            AssertionFailure::new("The response body is not text", format!("{} bytes", bytes.len()))
        })
    }

    /// Body is a JSON object.
    ///
    /// # Errors
    ///
    /// Fails when the body is not JSON or not an object.
    pub fn assert_is_dict(&self, message: &str) -> AssertionOutcome {
        let value = self.json_body()?;
        check(value.is_object(), message, || {
            AssertionFailure::new(
                "The response body is not a JSON object",
                preview(&value.to_string()),
            )
        })
    }
}
