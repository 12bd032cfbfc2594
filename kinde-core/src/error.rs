//! Error types for the Kinde client.
//!
//! Every failure surfaces as a [`KindeError`]. Variants that relate to an
//! HTTP exchange carry the method and path so callers can log or branch on
//! them without keeping the request around.

use std::fmt;

use reqwest::{Method, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::token::TokenError;

/// Problems with the client configuration, raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or more required credential fields are empty.
    #[error("missing required Kinde client options: {}", .0.join(", "))]
    MissingOptions(Vec<&'static str>),

    /// The domain is not a valid absolute URL.
    #[error("invalid domain URL {domain:?}: {reason}")]
    InvalidDomain { domain: String, reason: String },
}

/// Why an exchange was classified as an authentication failure.
#[derive(Debug, Error)]
pub enum AuthenticationFailure {
    /// The API answered 401.
    #[error("invalid credentials or token")]
    Unauthorized,

    /// No access token could be obtained.
    #[error("failed to retrieve access token: {0}")]
    Token(#[source] TokenError),
}

/// Top-level error type for all client operations.
#[derive(Debug, Error)]
pub enum KindeError {
    /// The client configuration is incomplete or invalid.
    #[error("invalid client configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// The request payload could not be encoded as JSON.
    #[error("failed to marshal request payload for {method} {path}: {source}")]
    Serialization {
        method: Method,
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server could not be reached or the response body could not be read.
    #[error("failed to execute {method} {path}: {source}")]
    Transport {
        method: Method,
        path: String,
        status: Option<StatusCode>,
        #[source]
        source: reqwest::Error,
    },

    /// The request was rejected as unauthenticated, or no token was available.
    #[error("failed to execute {method} {path}: authentication failed: {failure}")]
    Authentication {
        method: Method,
        path: String,
        status: Option<StatusCode>,
        #[source]
        failure: AuthenticationFailure,
    },

    /// The API reported structured errors in the response body.
    #[error("failed to execute {method} {path}: request failed: {errors}")]
    Api {
        method: Method,
        path: String,
        status: StatusCode,
        errors: ApiErrors,
    },

    /// The API answered with an error status and no structured errors.
    #[error("failed to execute {method} {path}: unexpected status code {status}: {body}")]
    UnexpectedStatus {
        method: Method,
        path: String,
        status: StatusCode,
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to execute {method} {path}: failed to parse response body: {source}")]
    Decoding {
        method: Method,
        path: String,
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },

    /// A client-side lookup found no matching resource.
    #[error("failed to find {kind} with {id}")]
    NotFound { kind: &'static str, id: String },
}

impl KindeError {
    /// HTTP status associated with the failure, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport { status, .. } | Self::Authentication { status, .. } => *status,
            Self::Api { status, .. }
            | Self::UnexpectedStatus { status, .. }
            | Self::Decoding { status, .. } => Some(*status),
            Self::Configuration(_) | Self::Serialization { .. } | Self::NotFound { .. } => None,
        }
    }

    /// Structured API errors, if the server returned any.
    pub fn api_errors(&self) -> Option<&ApiErrors> {
        match self {
            Self::Api { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Whether the failure means the requested resource does not exist.
    ///
    /// True for client-side lookups that came up empty, 404 responses, and
    /// structured errors whose code contains `NOT_FOUND`.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Api { status, errors, .. } => {
                *status == StatusCode::NOT_FOUND
                    || errors.iter().any(|e| e.code.contains("NOT_FOUND"))
            }
            Self::UnexpectedStatus { status, .. } => *status == StatusCode::NOT_FOUND,
            _ => false,
        }
    }

    /// Whether the failure is a configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// A single structured error reported by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: String,

    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = if self.message.is_empty() { "N/A" } else { &self.message };
        write!(f, "{}: {}", self.code, message)
    }
}

/// The list of errors from an `errors` field.
///
/// The API sends either a single object or an array; both deserialize to
/// the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ApiErrors(Vec<ApiError>);

impl ApiErrors {
    /// Wrap a list of errors.
    pub fn new(errors: Vec<ApiError>) -> Self {
        Self(errors)
    }

    /// Whether any error carries the given code.
    pub fn has(&self, code: &str) -> bool {
        self.0.iter().any(|e| e.code == code)
    }

    /// Iterate over the errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ApiError> {
        self.0.iter()
    }

    /// Number of errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ApiErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl<'a> IntoIterator for &'a ApiErrors {
    type Item = &'a ApiError;
    type IntoIter = std::slice::Iter<'a, ApiError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for ApiErrors {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<ApiError>),
            One(ApiError),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::Many(errors) => Self(errors),
            OneOrMany::One(error) => Self(vec![error]),
        })
    }
}
