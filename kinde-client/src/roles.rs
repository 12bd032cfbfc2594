//! Roles and the permissions they grant.

use kinde_core::{ApiClient, KindeError, Method, NO_PAYLOAD, execute, fetch};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::de::null_as_default;
use crate::permissions::Permission;

kinde_core::string_enum! {
    /// Operation applied to a permission when updating a role.
    pub enum PermissionOperation {
        /// Remove the permission from the role.
        Delete => "delete",
    }
}

/// A role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub key: String,
    pub description: Option<String>,
    pub is_default_role: bool,
    /// Permission ids, populated by [`RolesClient::get`].
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

/// Parameters for [`RolesClient::create`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateParams {
    pub name: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_role: Option<bool>,
}

/// Parameters for [`RolesClient::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_role: Option<bool>,
}

/// Change to one permission on a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionChange {
    pub id: String,
    /// `None` adds the permission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<PermissionOperation>,
}

impl PermissionChange {
    pub fn add(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operation: None,
        }
    }

    pub fn remove(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operation: Some(PermissionOperation::Delete),
        }
    }
}

/// Parameters for [`RolesClient::update_permissions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatePermissionsParams {
    pub permissions: Vec<PermissionChange>,
}

/// Result of [`RolesClient::update_permissions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdatePermissionsResponse {
    pub code: String,
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub permissions_added: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub permissions_removed: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListResponse {
    #[serde(deserialize_with = "null_as_default")]
    roles: Vec<Role>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SingleResponse {
    role: Role,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PermissionsResponse {
    #[serde(deserialize_with = "null_as_default")]
    permissions: Vec<Permission>,
}

/// Operations on `/api/v1/roles`.
#[derive(Debug)]
pub struct RolesClient<'a, C> {
    client: &'a C,
}

impl<'a, C: ApiClient> RolesClient<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Role>, KindeError> {
        let response: ListResponse =
            fetch(self.client, Method::GET, "/api/v1/roles", &[], NO_PAYLOAD).await?;
        Ok(response.roles)
    }

    pub async fn create(&self, params: &CreateParams) -> Result<Role, KindeError> {
        let response: SingleResponse =
            fetch(self.client, Method::POST, "/api/v1/roles", &[], Some(params)).await?;
        debug!(id = %response.role.id, key = %response.role.key, "created role");
        Ok(response.role)
    }

    /// Fetch a role together with the ids of its permissions.
    pub async fn get(&self, id: &str) -> Result<Role, KindeError> {
        let endpoint = format!("/api/v1/roles/{}", id);
        let response: SingleResponse =
            fetch(self.client, Method::GET, &endpoint, &[], NO_PAYLOAD).await?;

        let mut role = response.role;
        role.permissions = self
            .get_permissions(id)
            .await?
            .into_iter()
            .map(|permission| permission.id)
            .collect();
        Ok(role)
    }

    /// Permissions granted by a role.
    pub async fn get_permissions(&self, id: &str) -> Result<Vec<Permission>, KindeError> {
        let endpoint = format!("/api/v1/roles/{}/permissions", id);
        let response: PermissionsResponse =
            fetch(self.client, Method::GET, &endpoint, &[], NO_PAYLOAD).await?;
        Ok(response.permissions)
    }

    pub async fn update(&self, id: &str, params: &UpdateParams) -> Result<Role, KindeError> {
        let endpoint = format!("/api/v1/roles/{}", id);
        let response: SingleResponse =
            fetch(self.client, Method::PATCH, &endpoint, &[], Some(params)).await?;
        Ok(response.role)
    }

    pub async fn delete(&self, id: &str) -> Result<(), KindeError> {
        let endpoint = format!("/api/v1/roles/{}", id);
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }

    /// Add or remove several permissions at once.
    pub async fn update_permissions(
        &self,
        id: &str,
        params: &UpdatePermissionsParams,
    ) -> Result<UpdatePermissionsResponse, KindeError> {
        let endpoint = format!("/api/v1/roles/{}/permissions", id);
        fetch(self.client, Method::PATCH, &endpoint, &[], Some(params)).await
    }

    pub async fn remove_permission(&self, id: &str, permission_id: &str) -> Result<(), KindeError> {
        let endpoint = format!("/api/v1/roles/{}/permissions/{}", id, permission_id);
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }
}
