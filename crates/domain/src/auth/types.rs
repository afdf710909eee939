//! Authentication configuration types

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Header name used by API key auth when none is given.
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-KEY";

/// Authentication strategy for a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// `Authorization: Bearer <token>`
    Bearer {
        /// The bearer token
        token: String,
    },
    /// `Authorization: Basic base64("token: <token>")`
    BasicToken {
        /// The opaque token
        token: String,
    },
    /// API key sent as a header or a query parameter
    ApiKey {
        /// Key name
        key: String,
        /// Key value
        value: String,
        /// Where to add the key
        #[serde(default)]
        add_to: ApiKeyLocation,
        /// Header used in header mode; defaults to `X-API-KEY`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        header_name: Option<String>,
    },
    /// Standard HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },
    /// HTTP Digest authentication, answered after the server's challenge
    Digest {
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

/// Location for API key authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyLocation {
    /// Add to request headers
    #[default]
    Headers,
    /// Add to query parameters
    QueryParams,
}

impl ApiKeyLocation {
    /// Returns the configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Headers => "headers",
            Self::QueryParams => "query_params",
        }
    }
}

impl fmt::Display for ApiKeyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiKeyLocation {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "headers" => Ok(Self::Headers),
            "query_params" => Ok(Self::QueryParams),
            other => Err(DomainError::InvalidAuth(format!(
                "add_to must be 'headers' or 'query_params', got '{other}'"
            ))),
        }
    }
}

impl AuthConfig {
    /// Creates a bearer token authentication.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAuth` if the token is empty.
    pub fn bearer(token: impl Into<String>) -> DomainResult<Self> {
        let auth = Self::Bearer {
            token: token.into(),
        };
        auth.validate()?;
        Ok(auth)
    }

    /// Creates a basic-token authentication.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAuth` if the token is empty.
    pub fn basic_token(token: impl Into<String>) -> DomainResult<Self> {
        let auth = Self::BasicToken {
            token: token.into(),
        };
        auth.validate()?;
        Ok(auth)
    }

    /// Creates an API key authentication.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAuth` if `add_to` is not `headers` or `query_params`.
    pub fn api_key(
        key: impl Into<String>,
        value: impl Into<String>,
        add_to: &str,
        header_name: Option<String>,
    ) -> DomainResult<Self> {
        Ok(Self::ApiKey {
            key: key.into(),
            value: value.into(),
            add_to: add_to.parse()?,
            header_name,
        })
    }

    /// Creates a basic authentication.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates a digest authentication.
    #[must_use]
    pub fn digest(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Digest {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAuth` for an empty bearer or basic token.
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            Self::Bearer { token } if token.is_empty() => Err(DomainError::InvalidAuth(
                "bearer token must be a non-empty string".to_string(),
            )),
            Self::BasicToken { token } if token.is_empty() => Err(DomainError::InvalidAuth(
                "basic token must be a non-empty string".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Short name of the strategy, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bearer { .. } => "bearer",
            Self::BasicToken { .. } => "basic_token",
            Self::ApiKey { .. } => "api_key",
            Self::Basic { .. } => "basic",
            Self::Digest { .. } => "digest",
        }
    }

    /// Resolves the static part of the strategy.
    ///
    /// Digest has nothing to add before the server challenges, so it resolves
    /// to [`AuthResolution::AwaitChallenge`].
    #[must_use]
    pub fn resolve(&self) -> AuthResolution {
        match self {
            Self::Bearer { token } => AuthResolution::Header {
                name: "Authorization".to_string(),
                value: format!("Bearer {token}"),
            },
            Self::BasicToken { token } => AuthResolution::Header {
                name: "Authorization".to_string(),
                value: format!("Basic {}", STANDARD.encode(format!("token: {token}"))),
            },
            Self::Basic { username, password } => AuthResolution::Header {
                name: "Authorization".to_string(),
                value: format!("Basic {}", STANDARD.encode(format!("{username}:{password}"))),
            },
            Self::ApiKey { key, value, .. } if key.is_empty() || value.is_empty() => {
                AuthResolution::None
            }
            Self::ApiKey {
                key,
                value,
                add_to: ApiKeyLocation::Headers,
                header_name,
            } => AuthResolution::Header {
                name: header_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
                value: format!("{key} : {value}"),
            },
            Self::ApiKey {
                key,
                value,
                add_to: ApiKeyLocation::QueryParams,
                ..
            } => AuthResolution::QueryParam {
                name: key.clone(),
                value: value.clone(),
            },
            Self::Digest { .. } => AuthResolution::AwaitChallenge,
        }
    }
}

/// What an auth strategy adds to an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResolution {
    /// Nothing to add.
    None,
    /// Add this header to the request.
    Header {
        /// Header name (e.g., "Authorization").
        name: String,
        /// Header value (e.g., "Bearer token123").
        value: String,
    },
    /// Add this query parameter.
    QueryParam {
        /// Query parameter name.
        name: String,
        /// Query parameter value.
        value: String,
    },
    /// Send unauthenticated and answer a `401` challenge.
    AwaitChallenge,
}
