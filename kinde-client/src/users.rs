//! Users and their identities.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kinde_core::{ApiClient, KindeError, Method, NO_PAYLOAD, StringEnum, execute, fetch};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::de::{list_query, null_as_default};

kinde_core::string_enum! {
    /// Sort order for [`UsersClient::list`].
    pub enum UserSort {
        NameAsc => "name_asc",
        NameDesc => "name_desc",
        EmailAsc => "email_asc",
        EmailDesc => "email_desc",
        IdAsc => "id_asc",
        IdDesc => "id_desc",
    }
}

kinde_core::string_enum! {
    /// Kind of identity attached to a user.
    pub enum IdentityType {
        Email => "email",
        Username => "username",
        Phone => "phone",
        Enterprise => "enterprise",
        Social => "social",
    }
}

/// A user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub provided_id: Option<String>,
    pub preferred_email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub picture: Option<String>,
    pub is_suspended: bool,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
    pub last_signed_in: Option<DateTime<Utc>>,
}

/// A way a user can sign in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub is_confirmed: Option<bool>,
    pub is_primary: Option<bool>,
    pub total_logins: u64,
    pub created_on: Option<DateTime<Utc>>,
    pub last_login_on: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub details: HashMap<String, String>,
}

/// Parameters for [`UsersClient::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub sort: Option<UserSort>,
    pub page_size: Option<u32>,
    pub next_token: Option<String>,
}

/// Profile of a new user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided_id: Option<String>,
}

/// An identity to create alongside a new user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewIdentity {
    #[serde(rename = "type")]
    pub kind: IdentityType,
    pub details: HashMap<String, String>,
}

impl NewIdentity {
    /// An email identity for `email`.
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            kind: IdentityType::Email,
            details: HashMap::from([("email".to_string(), email.into())]),
        }
    }
}

/// Parameters for [`UsersClient::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateParams {
    pub profile: Profile,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<NewIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_code: Option<String>,
}

/// Parameters for [`UsersClient::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_suspended: Option<bool>,
}

/// Parameters for [`UsersClient::add_identity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddIdentityParams {
    pub value: String,
    #[serde(rename = "type")]
    pub kind: IdentityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_country_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListResponse {
    #[serde(deserialize_with = "null_as_default")]
    users: Vec<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateResponse {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UpdateResponse {
    id: String,
    email: Option<String>,
    picture: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    is_suspended: bool,
}

impl From<UpdateResponse> for User {
    fn from(response: UpdateResponse) -> Self {
        Self {
            id: response.id,
            preferred_email: response.email,
            picture: response.picture,
            first_name: response.given_name,
            last_name: response.family_name,
            is_suspended: response.is_suspended,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IdentityResponse {
    identity: Identity,
}

/// Operations on `/api/v1/user(s)`.
#[derive(Debug)]
pub struct UsersClient<'a, C> {
    client: &'a C,
}

impl<'a, C: ApiClient> UsersClient<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Fetch a single page of users.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<User>, KindeError> {
        let query = list_query(
            params.sort.as_ref().map(StringEnum::as_str),
            params.page_size,
            params.next_token.as_deref(),
        );

        let response: ListResponse =
            fetch(self.client, Method::GET, "/api/v1/users", &query, NO_PAYLOAD).await?;
        Ok(response.users)
    }

    /// Create a user and return the stored record.
    pub async fn create(&self, params: &CreateParams) -> Result<User, KindeError> {
        let response: CreateResponse =
            fetch(self.client, Method::POST, "/api/v1/user", &[], Some(params)).await?;
        debug!(id = %response.id, "created user");
        self.get(&response.id).await
    }

    pub async fn get(&self, id: &str) -> Result<User, KindeError> {
        let query = [("id", id.to_string())];
        fetch(self.client, Method::GET, "/api/v1/user", &query, NO_PAYLOAD).await
    }

    /// Update a user.
    ///
    /// Only the fields Kinde echoes back are populated on the returned user.
    pub async fn update(&self, id: &str, params: &UpdateParams) -> Result<User, KindeError> {
        let query = [("id", id.to_string())];
        let response: UpdateResponse =
            fetch(self.client, Method::PATCH, "/api/v1/user", &query, Some(params)).await?;
        Ok(response.into())
    }

    pub async fn delete(&self, id: &str) -> Result<(), KindeError> {
        let query = [("id", id.to_string())];
        execute(self.client, Method::DELETE, "/api/v1/user", &query, NO_PAYLOAD).await
    }

    /// Attach a new identity to a user.
    pub async fn add_identity(
        &self,
        id: &str,
        params: &AddIdentityParams,
    ) -> Result<Identity, KindeError> {
        let endpoint = format!("/api/v1/users/{}/identities", id);
        let response: IdentityResponse =
            fetch(self.client, Method::POST, &endpoint, &[], Some(params)).await?;
        Ok(response.identity)
    }
}
