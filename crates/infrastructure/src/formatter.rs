//! Response renderings for debugging: structured summary, raw transcript and
//! redirect history.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use serde_json::json;
use verdict_application::TransportError;
use verdict_domain::{CapturedResponse, DomainError, Headers};

use crate::serialization::to_json_stable;

/// Shape of [`summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Structured object with body, status, time, headers and a JSON flag.
    #[default]
    Json,
    /// The body as strict UTF-8.
    Content,
    /// The body as lossy UTF-8.
    Text,
}

impl FromStr for ResponseFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "content" | "multipart" => Ok(Self::Content),
            "text" => Ok(Self::Text),
            other => Err(DomainError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn decode_error(response: &CapturedResponse, message: impl Into<String>) -> TransportError {
    let request = response.request();
    TransportError::Decode {
        method: request.method,
        url: request.url.to_string(),
        message: message.into(),
    }
}

/// Renders the response in the requested format.
///
/// In JSON form a body that parses is embedded as JSON (`is_json: true`);
/// any other body is embedded as text (`is_json: false`).
///
/// # Errors
///
/// Returns `TransportError::Decode` when the response declares a JSON content
/// type but the body does not parse, or when `Content` is requested for a
/// body that is not valid UTF-8.
pub fn summary(
    response: &CapturedResponse,
    format: ResponseFormat,
) -> Result<String, TransportError> {
    match format {
        ResponseFormat::Json => {
            let (body, is_json) = match response.json() {
                Ok(value) => (value, true),
                Err(e) if response.is_json() => return Err(decode_error(response, e.to_string())),
                Err(_) => (json!(response.text()), false),
            };
            let headers: BTreeMap<&str, &str> = response
                .headers()
                .iter()
                .map(|h| (h.name.as_str(), h.value.as_str()))
                .collect();
            let rendered = json!({
                "response_body": body,
                "response_status_code": response.status().as_u16(),
                "response_time": response.elapsed_secs(),
                "response_headers": headers,
                "is_json": is_json,
            });
            to_json_stable(&rendered).map_err(|e| decode_error(response, e.to_string()))
        }
        ResponseFormat::Content => String::from_utf8(response.bytes().to_vec())
            .map_err(|e| decode_error(response, e.to_string())),
        ResponseFormat::Text => Ok(response.text().to_string()),
    }
}

fn write_headers(out: &mut String, headers: &Headers) {
    for header in headers.iter() {
        let _ = writeln!(out, "{} : {}", header.name, header.value);
    }
}

/// Raw request/response dump.
#[must_use]
pub fn transcript(response: &CapturedResponse) -> String {
    let request = response.request();
    let mut out = String::new();

    out.push_str("---- Request ----\n");
    let _ = writeln!(out, "{} {}", request.method, request.url);
    write_headers(&mut out, &request.headers);
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&request.body));
    out.push('\n');

    out.push_str("---- Response ----\n");
    let _ = writeln!(out, "{} {}", response.status(), response.final_url());
    write_headers(&mut out, response.headers());
    out.push('\n');
    out.push_str(response.text());
    out.push('\n');

    out
}

/// Redirect history: a count line, then one line per hop.
///
/// With no hops the count is 0 and the note tells a disabled redirect flag
/// apart from a call that simply was not redirected.
#[must_use]
pub fn history(response: &CapturedResponse) -> String {
    let hops = response.history();
    let mut out = format!("Count history : {}\n", hops.len());

    if hops.is_empty() {
        if response.redirects_enabled() {
            out.push_str("No redirect happened\n");
        } else {
            out.push_str(
                "Redirect following is disabled; \
                 enable `allow_redirects` to record redirects\n",
            );
        }
        return out;
    }

    for hop in hops {
        let _ = writeln!(out, "URL redirects : {}", hop.url);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use url::Url;
    use verdict_domain::{HttpMethod, RedirectHop, RequestEcho};

    fn response(status: u16, content_type: &str, body: &[u8]) -> CapturedResponse {
        let headers: Headers = [("Content-Type", content_type)].into_iter().collect();
        let request_headers: Headers = [("Accept", "*/*")].into_iter().collect();
        CapturedResponse::new(
            status,
            headers,
            body.to_vec(),
            Duration::from_millis(250),
            RequestEcho {
                method: HttpMethod::Post,
                url: Url::parse("https://api.example.com/posts").unwrap(),
                headers: request_headers,
                body: br#"{"a":1}"#.to_vec(),
            },
        )
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ResponseFormat>().unwrap(), ResponseFormat::Json);
        assert_eq!("multipart".parse::<ResponseFormat>().unwrap(), ResponseFormat::Content);
        assert_eq!("text".parse::<ResponseFormat>().unwrap(), ResponseFormat::Text);
        assert_eq!(
            "xml".parse::<ResponseFormat>(),
            Err(DomainError::UnsupportedFormat("xml".to_string()))
        );
    }

    #[test]
    fn test_json_summary() {
        let rendered = summary(
            &response(201, "application/json", br#"{"b":2,"a":1}"#),
            ResponseFormat::Json,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["response_body"], json!({"a": 1, "b": 2}));
        assert_eq!(value["response_status_code"], 201);
        assert_eq!(value["response_time"], 0.25);
        assert_eq!(value["response_headers"]["Content-Type"], "application/json");
        assert_eq!(value["is_json"], true);
        assert!(rendered.ends_with("}\n"));
    }

    #[test]
    fn test_json_summary_of_plain_text() {
        let rendered =
            summary(&response(200, "text/plain", b"hello"), ResponseFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["response_body"], "hello");
        assert_eq!(value["is_json"], false);
    }

    #[test]
    fn test_json_summary_of_broken_json_is_decode_error() {
        let result = summary(
            &response(200, "application/json", b"{oops"),
            ResponseFormat::Json,
        );
        let err = result.unwrap_err();
        assert_eq!(err.kind(), "decode");
        assert!(
            err.to_string()
                .starts_with("POST https://api.example.com/posts: unable to decode")
        );
    }

    #[test]
    fn test_content_summary_requires_utf8() {
        let ok = summary(&response(200, "text/plain", b"abc"), ResponseFormat::Content).unwrap();
        assert_eq!(ok, "abc");

        let bad = summary(
            &response(200, "application/octet-stream", &[0xff, 0xfe]),
            ResponseFormat::Content,
        );
        assert!(matches!(bad, Err(TransportError::Decode { .. })));

        let lossy = summary(
            &response(200, "application/octet-stream", &[0xff]),
            ResponseFormat::Text,
        )
        .unwrap();
        assert_eq!(lossy, "\u{fffd}");
    }

    #[test]
    fn test_transcript() {
        let text = transcript(&response(201, "application/json", br#"{"a":1}"#));
        assert_eq!(
            text,
            "---- Request ----\n\
             POST https://api.example.com/posts\n\
             Accept : */*\n\
             \n\
             {\"a\":1}\n\
             ---- Response ----\n\
             201 Created https://api.example.com/posts\n\
             Content-Type : application/json\n\
             \n\
             {\"a\":1}\n"
        );
    }

    #[test]
    fn test_history_disabled() {
        let text = history(&response(302, "text/html", b""));
        assert!(text.starts_with("Count history : 0\n"));
        assert!(text.contains("disabled"));
    }

    #[test]
    fn test_history_enabled_without_redirect() {
        let text = history(&response(200, "text/html", b"").with_history(vec![], true));
        assert_eq!(text, "Count history : 0\nNo redirect happened\n");
    }

    #[test]
    fn test_history_lists_hops() {
        let hops = vec![
            RedirectHop {
                status: 301.into(),
                url: Url::parse("http://example.com/a").unwrap(),
            },
            RedirectHop {
                status: 302.into(),
                url: Url::parse("https://example.com/b").unwrap(),
            },
        ];
        let text = history(&response(200, "text/html", b"").with_history(hops, true));
        assert_eq!(
            text,
            concat!(
                "Count history : 2\n",
                "URL redirects : http://example.com/a\n",
                "URL redirects : https://example.com/b\n",
            )
        );
    }
}
