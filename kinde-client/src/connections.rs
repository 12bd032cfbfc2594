//! Authentication connections (social, enterprise and built-in strategies).

use kinde_core::{ApiClient, KindeError, Method, NO_PAYLOAD, execute, fetch, validate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::de::null_as_default;

const ENDPOINT: &str = "/api/v1/connections";

kinde_core::string_enum! {
    /// Identity provider behind a connection.
    pub enum Strategy {
        EmailPassword => "email:password",
        EmailOtp => "email:otp",
        PhoneOtp => "phone:otp",
        UsernamePassword => "username:password",
        UsernameOtp => "username:otp",
        Apple => "oauth2:apple",
        AzureAdOauth2 => "oauth2:azure_ad",
        Bitbucket => "oauth2:bitbucket",
        Discord => "oauth2:discord",
        Facebook => "oauth2:facebook",
        Github => "oauth2:github",
        Gitlab => "oauth2:gitlab",
        Google => "oauth2:google",
        LinkedIn => "oauth2:linkedin",
        Microsoft => "oauth2:microsoft",
        Patreon => "oauth2:patreon",
        Slack => "oauth2:slack",
        Stripe => "oauth2:stripe",
        Twitch => "oauth2:twitch",
        Twitter => "oauth2:twitter",
        Xero => "oauth2:xero",
        SamlCustom => "saml:custom",
        AzureAdWsFed => "wsfed:azure_ad",
    }
}

/// A connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub display_name: String,
    /// Raw strategy string; Kinde may report strategies this crate does not know.
    pub strategy: String,
    #[serde(deserialize_with = "null_as_default")]
    pub enabled_applications: Vec<String>,
    pub options: Option<Value>,
}

impl Connection {
    /// The strategy, if it is one of the known [`Strategy`] values.
    pub fn strategy(&self) -> Option<Strategy> {
        validate(&self.strategy).ok()
    }
}

/// Options for OAuth2 social connections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConnectionOptions {
    pub client_id: String,
    pub client_secret: String,
    pub is_use_custom_domain: bool,
}

/// Options for Azure AD connections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzureAdConnectionOptions {
    pub client_id: String,
    pub client_secret: String,
    pub home_realm_domains: Vec<String>,
    pub entra_id_domain: String,
    pub is_use_common_endpoint: bool,
    pub is_sync_user_profile_on_login: bool,
    pub is_retrieve_provider_user_groups: bool,
    pub is_extended_attributes_required: bool,
}

/// Options for SAML connections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamlConnectionOptions {
    pub home_realm_domains: Vec<String>,
    pub saml_entity_id: String,
    pub saml_acs_url: String,
    pub saml_idp_metadata_url: String,
    pub saml_email_key_attr: String,
    pub saml_first_name_key_attr: String,
    pub saml_last_name_key_attr: String,
    pub is_create_missing_user: bool,
    #[serde(rename = "saml_signing_certificate")]
    pub saml_signing_cert: String,
    pub saml_signing_private_key: String,
}

/// Parameters for [`ConnectionsClient::create`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateParams {
    pub name: String,
    pub display_name: String,
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled_applications: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Parameters for [`ConnectionsClient::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_applications: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Parameters for [`ConnectionsClient::replace`]; overwrites the whole connection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaceParams {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled_applications: Vec<String>,
    pub options: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListResponse {
    #[serde(deserialize_with = "null_as_default")]
    connections: Vec<Connection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SingleResponse {
    connection: Connection,
}

/// Operations on `/api/v1/connections`.
#[derive(Debug)]
pub struct ConnectionsClient<'a, C> {
    client: &'a C,
}

impl<'a, C: ApiClient> ConnectionsClient<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Connection>, KindeError> {
        let response: ListResponse =
            fetch(self.client, Method::GET, ENDPOINT, &[], NO_PAYLOAD).await?;
        Ok(response.connections)
    }

    pub async fn create(&self, params: &CreateParams) -> Result<Connection, KindeError> {
        let response: SingleResponse =
            fetch(self.client, Method::POST, ENDPOINT, &[], Some(params)).await?;
        debug!(id = %response.connection.id, strategy = %params.strategy, "created connection");
        Ok(response.connection)
    }

    pub async fn get(&self, id: &str) -> Result<Connection, KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        let response: SingleResponse =
            fetch(self.client, Method::GET, &endpoint, &[], NO_PAYLOAD).await?;
        Ok(response.connection)
    }

    /// Patch the given fields and return the updated connection.
    pub async fn update(&self, id: &str, params: &UpdateParams) -> Result<Connection, KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        execute(self.client, Method::PATCH, &endpoint, &[], Some(params)).await?;
        self.get(id).await
    }

    /// Replace the whole connection and return its new state.
    pub async fn replace(
        &self,
        id: &str,
        params: &ReplaceParams,
    ) -> Result<Connection, KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        execute(self.client, Method::PUT, &endpoint, &[], Some(params)).await?;
        self.get(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }
}
