//! HTTP Request body types

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A file attached to a multipart body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilePart {
    /// Read from disk at send time.
    Path(PathBuf),
    /// In-memory content.
    Inline {
        /// File name reported in the part's `Content-Disposition`.
        file_name: String,
        /// Raw bytes.
        content: Vec<u8>,
        /// Explicit MIME type; guessed from `file_name` when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
    },
}

impl FilePart {
    /// Creates an in-memory part.
    #[must_use]
    pub fn inline(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self::Inline {
            file_name: file_name.into(),
            content: content.into(),
            content_type: None,
        }
    }
}

/// Which wire encoding a body resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Nothing is sent.
    None,
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
    /// `multipart/form-data`; form fields travel as text parts.
    Multipart,
}

/// All body variants of a call.
///
/// Every field is always present (empty when unused). When several are set,
/// files win over JSON, and JSON wins over plain form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Form fields.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
    /// Multipart file parts keyed by field name.
    #[serde(default)]
    pub files: BTreeMap<String, FilePart>,
    /// JSON payload; an empty object means "no JSON body".
    #[serde(default = "empty_object")]
    pub json: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for RequestBody {
    fn default() -> Self {
        Self {
            data: BTreeMap::new(),
            files: BTreeMap::new(),
            json: empty_object(),
        }
    }
}

impl RequestBody {
    /// Creates an empty body.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a JSON body.
    #[must_use]
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            json: value,
            ..Self::default()
        }
    }

    /// Creates a form body.
    #[must_use]
    pub fn form(data: BTreeMap<String, String>) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Returns true if the JSON payload carries anything worth sending.
    #[must_use]
    pub fn has_json(&self) -> bool {
        match &self.json {
            serde_json::Value::Null => false,
            serde_json::Value::Object(map) => !map.is_empty(),
            _ => true,
        }
    }

    /// Resolves the wire encoding.
    #[must_use]
    pub fn kind(&self) -> BodyKind {
        if !self.files.is_empty() {
            BodyKind::Multipart
        } else if self.has_json() {
            BodyKind::Json
        } else if !self.data.is_empty() {
            BodyKind::Form
        } else {
            BodyKind::None
        }
    }

    /// Returns true if nothing would be sent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind() == BodyKind::None
    }

    /// Serializes the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.json)
    }
}
