//! Client-credentials token transport.
//!
//! This module provides:
//! - [`CachedToken`] - An access token with its expiry
//! - [`TokenTransport`] - Exchanges credentials for tokens, caches them, and
//!   decorates outgoing requests with the bearer token
//! - [`TokenError`] - Failures of the token exchange
//!
//! # Refresh policy
//!
//! The cached token is checked under a shared read lock, so concurrent
//! requests holding a valid token never wait on each other. A missing or
//! expired token is replaced under the exclusive write lock; callers that
//! queued behind an in-flight refresh re-check the cache once they get the
//! lock and reuse the fresh token instead of exchanging again.

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

use crate::config::Credentials;
use crate::error::{AuthenticationFailure, KindeError};
use crate::secret::Secret;

/// Seconds subtracted from the declared lifetime so a token never expires
/// mid-flight.
pub const EXPIRY_MARGIN_SECONDS: i64 = 30;

/// The only token type the API issues.
pub const BEARER_TOKEN_TYPE: &str = "bearer";

/// Error type for token exchange failures.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token endpoint could not be reached or its body could not be read.
    #[error("failed to round trip request: {0}")]
    Request(#[source] reqwest::Error),

    /// The token endpoint answered with a status other than 200.
    #[error("unexpected status code: {status}, body: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// The token endpoint issued something other than a bearer token.
    #[error("unexpected token type: expected 'bearer', got '{0}'")]
    UnexpectedTokenType(String),

    /// The token endpoint body was not the expected JSON.
    #[error("failed to parse response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The issued token cannot be sent as an HTTP header value.
    #[error("access token contains characters not allowed in a header")]
    InvalidHeader,
}

/// Successful body of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenExchangeResponse {
    /// The issued access token.
    pub access_token: String,

    /// Declared lifetime in seconds.
    #[serde(default)]
    pub expires_in: i64,

    /// Granted scopes, space separated.
    #[serde(default)]
    pub scope: String,

    /// Token type; must be `bearer`.
    #[serde(default)]
    pub token_type: String,
}

/// An access token together with the instant after which it must not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    value: Secret,
    expiry: DateTime<Utc>,
}

impl CachedToken {
    /// Create a cached token.
    pub fn new(value: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self {
            value: Secret::new(value),
            expiry,
        }
    }

    /// Build the cache entry for an exchange that completed at `now`.
    ///
    /// The expiry is `now + expires_in - 30s`, clamped to the representable
    /// range when the declared lifetime is out of bounds.
    pub fn from_exchange(response: &TokenExchangeResponse, now: DateTime<Utc>) -> Self {
        let seconds = response.expires_in.saturating_sub(EXPIRY_MARGIN_SECONDS);
        let expiry = Duration::try_seconds(seconds)
            .and_then(|lifespan| now.checked_add_signed(lifespan))
            .unwrap_or(if seconds > 0 {
                DateTime::<Utc>::MAX_UTC
            } else {
                DateTime::<Utc>::MIN_UTC
            });
        Self::new(response.access_token.clone(), expiry)
    }

    /// When the token stops being usable.
    pub fn expiry(&self) -> DateTime<Utc> {
        self.expiry
    }

    /// Whether the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }

    /// Whether the token can be sent at `now`: non-empty and not expired.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && !self.is_expired_at(now)
    }
}

/// Token-injecting transport over a `reqwest::Client`.
///
/// One instance per configured client; share it behind an `Arc` if several
/// clients should reuse the same token.
#[derive(Debug)]
pub struct TokenTransport {
    credentials: Credentials,
    token_url: Url,
    http: reqwest::Client,
    cache: RwLock<Option<CachedToken>>,
}

impl TokenTransport {
    /// Create a transport with an empty cache.
    ///
    /// Fails if the credentials are incomplete or the domain is not a URL.
    pub fn new(credentials: Credentials, http: reqwest::Client) -> Result<Self, KindeError> {
        credentials.validate()?;
        let token_url = credentials.token_url()?;

        Ok(Self {
            credentials,
            token_url,
            http,
            cache: RwLock::new(None),
        })
    }

    /// Seed the cache with an existing token.
    pub fn with_token(self, token: CachedToken) -> Self {
        Self {
            cache: RwLock::new(Some(token)),
            ..self
        }
    }

    /// The credentials this transport exchanges.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Expiry of the cached token, if one is cached.
    pub async fn cached_expiry(&self) -> Option<DateTime<Utc>> {
        self.cache.read().await.as_ref().map(CachedToken::expiry)
    }

    /// Return a valid access token, refreshing it first if necessary.
    pub async fn get_token(&self) -> Result<Secret, TokenError> {
        {
            let cache = self.cache.read().await;
            if let Some(token) = cache.as_ref().filter(|t| t.is_usable_at(Utc::now())) {
                return Ok(token.value.clone());
            }
        }

        let mut cache = self.cache.write().await;

        // Someone else may have refreshed while we waited for the lock.
        if let Some(token) = cache.as_ref().filter(|t| t.is_usable_at(Utc::now())) {
            tracing::debug!("reusing access token refreshed by a concurrent caller");
            return Ok(token.value.clone());
        }

        tracing::debug!(
            missing = cache.as_ref().is_none_or(|t| t.value.is_empty()),
            "refreshing access token"
        );

        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *cache = Some(fresh);
        Ok(value)
    }

    /// Exchange the credentials for a new token unconditionally.
    ///
    /// On failure the cached token is left as it was.
    pub async fn refresh_token(&self) -> Result<(), TokenError> {
        let mut cache = self.cache.write().await;
        let fresh = self.exchange().await?;
        *cache = Some(fresh);
        Ok(())
    }

    /// Send a request with the bearer token and the standard JSON headers.
    pub async fn round_trip(
        &self,
        mut request: reqwest::Request,
    ) -> Result<reqwest::Response, KindeError> {
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let token = match self.get_token().await {
            Ok(token) => token,
            Err(TokenError::Request(source)) => {
                return Err(KindeError::Transport {
                    method,
                    path,
                    status: None,
                    source,
                });
            }
            Err(e) => {
                return Err(KindeError::Authentication {
                    method,
                    path,
                    status: None,
                    failure: AuthenticationFailure::Token(e),
                });
            }
        };

        let bearer = HeaderValue::from_str(&format!("Bearer {}", token.expose())).map_err(|_| {
            KindeError::Authentication {
                method: method.clone(),
                path: path.clone(),
                status: None,
                failure: AuthenticationFailure::Token(TokenError::InvalidHeader),
            }
        })?;

        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        self.http
            .execute(request)
            .await
            .map_err(|source| KindeError::Transport {
                method,
                path,
                status: None,
                source,
            })
    }

    /// Perform the client-credentials grant.
    async fn exchange(&self) -> Result<CachedToken, TokenError> {
        let scope = self.credentials.scope_param();
        let form = [
            ("audience", self.credentials.audience.as_str()),
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.expose()),
            ("scope", scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        tracing::debug!("{} {}", Method::POST, self.token_url);

        let response = self
            .http
            .post(self.token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(TokenError::Request)?;

        let status = response.status();
        tracing::debug!("{} {} - response status: {}", Method::POST, self.token_url, status);

        let raw = response.bytes().await.map_err(TokenError::Request)?;

        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&raw).into_owned();
            tracing::warn!(%status, "token exchange rejected");
            return Err(TokenError::UnexpectedStatus { status, body });
        }

        let exchange: TokenExchangeResponse = serde_json::from_slice(&raw)?;

        if exchange.token_type != BEARER_TOKEN_TYPE {
            tracing::warn!(token_type = %exchange.token_type, "token exchange returned a non-bearer token");
            return Err(TokenError::UnexpectedTokenType(exchange.token_type));
        }

        let token = CachedToken::from_exchange(&exchange, Utc::now());
        tracing::debug!(expiry = %token.expiry, "access token refreshed");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(expires_in: i64) -> TokenExchangeResponse {
        TokenExchangeResponse {
            access_token: "token".to_string(),
            expires_in,
            scope: String::new(),
            token_type: BEARER_TOKEN_TYPE.to_string(),
        }
    }

    #[test]
    fn test_expiry_subtracts_safety_margin() {
        let now = Utc::now();
        let token = CachedToken::from_exchange(&exchange(60), now);

        assert_eq!(token.expiry(), now + Duration::seconds(30));
        assert!(token.is_usable_at(now));
        assert!(token.is_usable_at(now + Duration::seconds(29)));
        assert!(token.is_expired_at(now + Duration::seconds(31)));
        assert!(!token.is_usable_at(now + Duration::seconds(31)));
    }

    #[test]
    fn test_missing_lifetime_is_already_expired() {
        let now = Utc::now();
        let token = CachedToken::from_exchange(&exchange(0), now);
        assert!(token.is_expired_at(now + Duration::milliseconds(1)));
    }

    #[test]
    fn test_out_of_range_lifetime_is_clamped() {
        let now = Utc::now();

        let long = CachedToken::from_exchange(&exchange(i64::MAX), now);
        assert_eq!(long.expiry(), DateTime::<Utc>::MAX_UTC);
        assert!(long.is_usable_at(now));

        let negative = CachedToken::from_exchange(&exchange(i64::MIN), now);
        assert_eq!(negative.expiry(), DateTime::<Utc>::MIN_UTC);
        assert!(negative.is_expired_at(now));
    }

    #[test]
    fn test_empty_token_is_not_usable() {
        let token = CachedToken::new("", Utc::now() + Duration::hours(1));
        assert!(!token.is_usable_at(Utc::now()));
    }

    #[test]
    fn test_exchange_response_defaults() {
        let response: TokenExchangeResponse =
            serde_json::from_str(r#"{"access_token":"abc","token_type":"bearer"}"#).unwrap();
        assert_eq!(response.expires_in, 0);
        assert!(response.scope.is_empty());
    }

    #[test]
    fn test_transport_rejects_incomplete_credentials() {
        let creds = Credentials::new("https://acme.kinde.com", "aud", "id", "");
        let err = TokenTransport::new(creds, reqwest::Client::new()).unwrap_err();
        assert!(err.is_configuration());
    }
}
