//! HTTP request body builder.
//!
//! Turns the domain [`RequestBody`] into what the blocking client sends.
//! Files win over JSON and JSON wins over form data; when files are present
//! the form fields travel as text parts of the same multipart body.

use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};
use verdict_domain::{BodyKind, FilePart, RequestBody};

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// Failed to read a file part.
    #[error("failed to read file {path}: {message}")]
    FileRead {
        /// Offending path.
        path: String,
        /// Underlying I/O error text.
        message: String,
    },

    /// Invalid body configuration.
    #[error("invalid body configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: String,
    },

    /// Serialization error.
    #[error("serialization error: {message}")]
    Serialization {
        /// Underlying error text.
        message: String,
    },
}

/// Result of building a body.
pub enum BuiltBody {
    /// No body.
    None,
    /// Serialized body with its content type.
    Bytes {
        /// Wire bytes.
        content: Vec<u8>,
        /// `Content-Type` to send unless the caller set one.
        content_type: &'static str,
    },
    /// Multipart form data; the client sets the boundary content type.
    Multipart(Form),
}

impl BuiltBody {
    /// Get the Content-Type header value.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Bytes { content_type, .. } => Some(content_type),
            Self::None | Self::Multipart(_) => None,
        }
    }

    /// Bytes echoed back in the captured request. Multipart bodies are
    /// streamed and echo as empty.
    #[must_use]
    pub fn echo(&self) -> Vec<u8> {
        match self {
            Self::Bytes { content, .. } => content.clone(),
            Self::None | Self::Multipart(_) => Vec::new(),
        }
    }

    /// Check if this is a multipart form.
    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Check if this body is empty/none.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Build the wire body for a request.
///
/// # Errors
///
/// Returns an error if a file part cannot be read or the payload cannot be
/// serialized.
pub fn build_body(body: &RequestBody) -> Result<BuiltBody, BodyBuildError> {
    match body.kind() {
        BodyKind::None => Ok(BuiltBody::None),

        BodyKind::Json => {
            let content = body
                .json_bytes()
                .map_err(|e| BodyBuildError::Serialization {
                    message: e.to_string(),
                })?;
            Ok(BuiltBody::Bytes {
                content,
                content_type: "application/json",
            })
        }

        BodyKind::Form => {
            let encoded = serde_urlencoded::to_string(&body.data).map_err(|e| {
                BodyBuildError::Serialization {
                    message: e.to_string(),
                }
            })?;
            Ok(BuiltBody::Bytes {
                content: encoded.into_bytes(),
                content_type: "application/x-www-form-urlencoded",
            })
        }

        BodyKind::Multipart => build_multipart_form(body).map(BuiltBody::Multipart),
    }
}

/// Build a multipart form from the form fields and file parts.
fn build_multipart_form(body: &RequestBody) -> Result<Form, BodyBuildError> {
    let mut form = Form::new();

    for (name, value) in &body.data {
        form = form.text(name.clone(), value.clone());
    }

    for (name, file) in &body.files {
        form = form.part(name.clone(), build_file_part(file)?);
    }

    Ok(form)
}

fn build_file_part(file: &FilePart) -> Result<Part, BodyBuildError> {
    let (content, file_name, mime_type) = match file {
        FilePart::Path(path) => {
            let content = std::fs::read(path).map_err(|e| BodyBuildError::FileRead {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            (content, file_name_of(path), guess_mime(path))
        }
        FilePart::Inline {
            file_name,
            content,
            content_type,
        } => (
            content.clone(),
            file_name.clone(),
            content_type
                .clone()
                .unwrap_or_else(|| guess_mime(Path::new(file_name))),
        ),
    };

    Part::bytes(content)
        .file_name(file_name)
        .mime_str(&mime_type)
        .map_err(|e| BodyBuildError::InvalidConfig {
            message: format!("invalid MIME type {mime_type}: {e}"),
        })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string()
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::io::Write;

    #[test]
    fn test_build_json_body() {
        let body = RequestBody::json(serde_json::json!({"key": "value"}));

        match build_body(&body).unwrap() {
            BuiltBody::Bytes {
                content,
                content_type,
            } => {
                assert_eq!(content_type, "application/json");
                assert_eq!(content, br#"{"key":"value"}"#.to_vec());
            }
            _ => panic!("Expected bytes body"),
        }
    }

    #[test]
    fn test_empty_json_object_sends_nothing() {
        let body = RequestBody::json(serde_json::json!({}));
        assert!(build_body(&body).unwrap().is_none());
    }

    #[test]
    fn test_build_form_urlencoded() {
        let mut fields = BTreeMap::new();
        fields.insert("username".to_string(), "john".to_string());
        fields.insert("password".to_string(), "s3cret&more".to_string());

        let built = build_body(&RequestBody::form(fields)).unwrap();
        assert_eq!(built.content_type(), Some("application/x-www-form-urlencoded"));
        assert_eq!(
            String::from_utf8(built.echo()).unwrap(),
            "password=s3cret%26more&username=john"
        );
    }

    #[test]
    fn test_json_wins_over_form() {
        let mut body = RequestBody::json(serde_json::json!({"a": 1}));
        body.data.insert("ignored".to_string(), "yes".to_string());

        assert_eq!(build_body(&body).unwrap().content_type(), Some("application/json"));
    }

    #[test]
    fn test_files_build_multipart() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let mut body = RequestBody::json(serde_json::json!({"a": 1}));
        body.files
            .insert("upload".to_string(), FilePart::Path(file.path().to_path_buf()));
        body.files
            .insert("inline".to_string(), FilePart::inline("notes.txt", b"notes".to_vec()));

        let built = build_body(&body).unwrap();
        assert!(built.is_multipart());
        assert_eq!(built.content_type(), None);
        assert!(built.echo().is_empty());
    }

    #[test]
    fn test_missing_file_is_reported() {
        let mut body = RequestBody::none();
        body.files.insert(
            "upload".to_string(),
            FilePart::Path("/definitely/not/here.bin".into()),
        );

        let result = build_body(&body);
        assert!(matches!(
            result,
            Err(BodyBuildError::FileRead { path, .. }) if path == "/definitely/not/here.bin"
        ));
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a.json")), "application/json");
        assert_eq!(guess_mime(Path::new("a.unknownext")), "application/octet-stream");
    }
}
