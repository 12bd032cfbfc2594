//! Organizations and their members.

use chrono::{DateTime, Utc};
use kinde_core::{ApiClient, KindeError, Method, NO_PAYLOAD, execute, fetch};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::de::null_as_default;

/// A brand colour as returned by Kinde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Color {
    pub hex: String,
    pub raw: String,
}

/// An organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub code: String,
    pub name: String,
    pub handle: Option<String>,
    pub external_id: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub is_default: bool,
    pub is_auto_membership_enabled: bool,
    pub is_allow_registrations: Option<bool>,
    pub color_scheme: String,
    pub theme_code: Option<String>,
    pub logo: Option<String>,
    pub logo_dark: Option<String>,
    pub favicon_svg: Option<String>,
    pub favicon_fallback: Option<String>,
    pub link_color: Option<Color>,
    pub link_color_dark: Option<Color>,
    pub background_color: Option<Color>,
    pub background_color_dark: Option<Color>,
    pub button_color: Option<Color>,
    pub button_color_dark: Option<Color>,
    pub button_text_color: Option<Color>,
    pub button_text_color_dark: Option<Color>,
    pub card_border_radius: Option<String>,
    pub input_border_radius: Option<String>,
    pub button_border_radius: Option<String>,
}

/// Parameters for [`OrganizationsClient::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_personal: Option<bool>,
}

/// Parameters for [`OrganizationsClient::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color_dark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_color_dark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_text_color_dark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_color_dark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_auto_join_domain_list: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_custom_auth_connections_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enable_advanced_orgs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enforce_mfa: Option<bool>,
}

/// A user to add to an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddUser {
    pub id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

/// Parameters for [`OrganizationsClient::add_users`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddUsersParams {
    pub users: Vec<AddUser>,
}

/// A role held by an organization member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationRole {
    pub id: String,
    pub name: String,
    pub key: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListResponse {
    #[serde(deserialize_with = "null_as_default")]
    organizations: Vec<Organization>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateResponse {
    organization: Organization,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UserRolesResponse {
    #[serde(deserialize_with = "null_as_default")]
    roles: Vec<OrganizationRole>,
}

#[derive(Serialize)]
struct AddUserRoleParams<'a> {
    role_id: &'a str,
}

/// Operations on `/api/v1/organization(s)`.
#[derive(Debug)]
pub struct OrganizationsClient<'a, C> {
    client: &'a C,
}

impl<'a, C: ApiClient> OrganizationsClient<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Organization>, KindeError> {
        let response: ListResponse =
            fetch(self.client, Method::GET, "/api/v1/organizations", &[], NO_PAYLOAD).await?;
        Ok(response.organizations)
    }

    pub async fn create(&self, params: &CreateParams) -> Result<Organization, KindeError> {
        let response: CreateResponse =
            fetch(self.client, Method::POST, "/api/v1/organization", &[], Some(params)).await?;
        debug!(code = %response.organization.code, "created organization");
        Ok(response.organization)
    }

    /// Fetch an organization by code.
    pub async fn get(&self, code: &str) -> Result<Organization, KindeError> {
        let query = [("code", code.to_string())];
        fetch(self.client, Method::GET, "/api/v1/organization", &query, NO_PAYLOAD).await
    }

    /// Update an organization and return its new state.
    pub async fn update(
        &self,
        code: &str,
        params: &UpdateParams,
    ) -> Result<Organization, KindeError> {
        let endpoint = format!("/api/v1/organization/{}", code);
        execute(self.client, Method::PATCH, &endpoint, &[], Some(params)).await?;
        self.get(code).await
    }

    pub async fn delete(&self, code: &str) -> Result<(), KindeError> {
        let endpoint = format!("/api/v1/organization/{}", code);
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }

    /// Add users, with optional roles and permissions, to an organization.
    pub async fn add_users(&self, code: &str, params: &AddUsersParams) -> Result<(), KindeError> {
        let endpoint = format!("/api/v1/organizations/{}/users", code);
        execute(self.client, Method::POST, &endpoint, &[], Some(params)).await
    }

    pub async fn add_user_role(
        &self,
        code: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), KindeError> {
        let endpoint = format!("/api/v1/organizations/{}/users/{}/roles", code, user_id);
        let params = AddUserRoleParams { role_id };
        execute(self.client, Method::POST, &endpoint, &[], Some(&params)).await
    }

    /// Roles a member holds in an organization; empty when they hold none.
    pub async fn get_user_roles(
        &self,
        code: &str,
        user_id: &str,
    ) -> Result<Vec<OrganizationRole>, KindeError> {
        let endpoint = format!("/api/v1/organizations/{}/users/{}/roles", code, user_id);
        let response: UserRolesResponse =
            fetch(self.client, Method::GET, &endpoint, &[], NO_PAYLOAD).await?;
        Ok(response.roles)
    }

    pub async fn remove_user_role(
        &self,
        code: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), KindeError> {
        let endpoint = format!(
            "/api/v1/organizations/{}/users/{}/roles/{}",
            code, user_id, role_id
        );
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_organization_parses_colors_and_timestamps() {
        let org: Organization = serde_json::from_value(json!({
            "code": "org_1",
            "name": "Acme",
            "created_on": "2024-05-01T10:00:00Z",
            "is_default": true,
            "button_color": {"hex": "#fff", "raw": "fff"},
            "handle": null
        }))
        .unwrap();

        assert!(org.is_default);
        assert_eq!(org.button_color.unwrap().hex, "#fff");
        assert!(org.handle.is_none());
        assert!(org.created_on.is_some());
    }

    #[test]
    fn test_add_user_omits_empty_lists() {
        let params = AddUsersParams {
            users: vec![AddUser {
                id: "kp_1".into(),
                roles: vec!["admin".into()],
                ..Default::default()
            }],
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"users": [{"id": "kp_1", "roles": ["admin"]}]})
        );
    }
}
