//! Client credentials for the Kinde management API.
//!
//! [`Credentials`] is a plain value: build it from the environment with
//! [`Credentials::from_env`], from explicit values with [`Credentials::new`],
//! and adjust individual fields with the `with_*` setters. It is validated once
//! when a client is constructed.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;
use crate::secret::Secret;

/// Environment variable holding the tenant domain, e.g. `https://acme.kinde.com`.
pub const ENV_DOMAIN: &str = "KINDE_DOMAIN";
/// Environment variable holding the API audience.
pub const ENV_AUDIENCE: &str = "KINDE_AUDIENCE";
/// Environment variable holding the machine-to-machine client ID.
pub const ENV_CLIENT_ID: &str = "KINDE_CLIENT_ID";
/// Environment variable holding the machine-to-machine client secret.
pub const ENV_CLIENT_SECRET: &str = "KINDE_CLIENT_SECRET";
/// Environment variable holding a whitespace separated scope list.
pub const ENV_SCOPES: &str = "KINDE_SCOPES";

/// Path of the client-credentials token endpoint, relative to the domain.
pub const TOKEN_ENDPOINT_PATH: &str = "/oauth2/token";

/// Credentials used for the client-credentials exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Base URL of the Kinde tenant.
    #[serde(default)]
    pub domain: String,

    /// Audience requested for the access token.
    #[serde(default)]
    pub audience: String,

    /// Client ID of the machine-to-machine application.
    #[serde(default)]
    pub client_id: String,

    /// Client secret of the machine-to-machine application.
    #[serde(default)]
    pub client_secret: Secret,

    /// Scopes requested for the access token.
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Credentials {
    /// Create credentials from explicit values with no scopes.
    pub fn new(
        domain: impl Into<String>,
        audience: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            audience: audience.into(),
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret),
            scopes: Vec::new(),
        }
    }

    /// Read credentials from the `KINDE_*` environment variables.
    ///
    /// Unset variables leave the corresponding field empty; call
    /// [`validate`](Self::validate) to find out what is missing.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let scopes = lookup(ENV_SCOPES)
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            domain: lookup(ENV_DOMAIN).unwrap_or_default(),
            audience: lookup(ENV_AUDIENCE).unwrap_or_default(),
            client_id: lookup(ENV_CLIENT_ID).unwrap_or_default(),
            client_secret: Secret::new(lookup(ENV_CLIENT_SECRET).unwrap_or_default()),
            scopes,
        }
    }

    /// Set the domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Set the client ID.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Set the client secret.
    pub fn with_client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Secret::new(client_secret);
        self
    }

    /// Set the requested scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Check that every required field is present and the domain is a URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();

        if self.domain.is_empty() {
            missing.push("domain");
        }
        if self.audience.is_empty() {
            missing.push("audience");
        }
        if self.client_id.is_empty() {
            missing.push("client_id");
        }
        if self.client_secret.is_empty() {
            missing.push("client_secret");
        }

        if !missing.is_empty() {
            return Err(ConfigError::MissingOptions(missing));
        }

        self.base_url().map(|_| ())
    }

    /// Parse the domain into a base URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(self.domain.trim_end_matches('/')).map_err(|e| ConfigError::InvalidDomain {
            domain: self.domain.clone(),
            reason: e.to_string(),
        })
    }

    /// Full URL of the token endpoint.
    pub fn token_url(&self) -> Result<Url, ConfigError> {
        self.resolve(TOKEN_ENDPOINT_PATH)
    }

    /// Resolve an API path against the domain.
    ///
    /// A leading `/` on `path` is optional; any path already on the domain is
    /// kept as a prefix.
    pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
        let base = self.domain.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{}/{}", base, path)).map_err(|e| ConfigError::InvalidDomain {
            domain: self.domain.clone(),
            reason: e.to_string(),
        })
    }

    /// The scope parameter sent to the token endpoint.
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }
}
