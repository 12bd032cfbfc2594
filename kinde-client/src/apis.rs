//! APIs registered with the Kinde business.

use kinde_core::{ApiClient, KindeError, Method, NO_PAYLOAD, execute, fetch};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::de::null_as_default;

kinde_core::string_enum! {
    /// Operation applied to an application when authorizing it for an API.
    pub enum Operation {
        /// Revoke the application's access.
        Delete => "delete",
    }
}

/// An API registered in Kinde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Api {
    pub id: String,
    pub name: String,
    pub audience: String,
    pub is_management_api: bool,
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<ApiApplication>,
}

/// An application authorized to call an API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiApplication {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_active: Option<bool>,
}

/// Parameters for [`ApisClient::create`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateParams {
    pub name: String,
    pub audience: String,
}

/// Authorization change for one application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationAuthorization {
    pub id: String,
    /// `None` grants access.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
}

impl ApplicationAuthorization {
    /// Grant `id` access to the API.
    pub fn grant(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operation: None,
        }
    }

    /// Revoke access for `id`.
    pub fn revoke(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            operation: Some(Operation::Delete),
        }
    }
}

/// Parameters for [`ApisClient::authorize_applications`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthorizeApplicationsParams {
    pub applications: Vec<ApplicationAuthorization>,
}

/// Result of an authorization change.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthorizeApplicationsResponse {
    pub code: String,
    pub message: String,
    #[serde(deserialize_with = "null_as_default")]
    pub applications_connected: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub applications_disconnected: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListResponse {
    #[serde(deserialize_with = "null_as_default")]
    apis: Vec<Api>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SingleResponse {
    api: Api,
}

/// Operations on `/api/v1/apis`.
#[derive(Debug)]
pub struct ApisClient<'a, C> {
    client: &'a C,
}

impl<'a, C: ApiClient> ApisClient<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// List every API.
    pub async fn list(&self) -> Result<Vec<Api>, KindeError> {
        let response: ListResponse =
            fetch(self.client, Method::GET, "/api/v1/apis", &[], NO_PAYLOAD).await?;
        Ok(response.apis)
    }

    /// Register an API.
    ///
    /// Kinde only returns the new id; every other field is left at its default.
    pub async fn create(&self, params: &CreateParams) -> Result<Api, KindeError> {
        let response: SingleResponse =
            fetch(self.client, Method::POST, "/api/v1/apis", &[], Some(params)).await?;
        debug!(id = %response.api.id, "created api");

        Ok(Api {
            id: response.api.id,
            ..Api::default()
        })
    }

    pub async fn get(&self, id: &str) -> Result<Api, KindeError> {
        let endpoint = format!("/api/v1/apis/{}", id);
        let response: SingleResponse =
            fetch(self.client, Method::GET, &endpoint, &[], NO_PAYLOAD).await?;
        Ok(response.api)
    }

    pub async fn delete(&self, id: &str) -> Result<(), KindeError> {
        let endpoint = format!("/api/v1/apis/{}", id);
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }

    /// Grant or revoke application access to an API.
    pub async fn authorize_applications(
        &self,
        id: &str,
        params: &AuthorizeApplicationsParams,
    ) -> Result<AuthorizeApplicationsResponse, KindeError> {
        let endpoint = format!("/api/v1/apis/{}/applications", id);
        fetch(self.client, Method::PATCH, &endpoint, &[], Some(params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_authorization_operation_serialization() {
        let params = AuthorizeApplicationsParams {
            applications: vec![
                ApplicationAuthorization::grant("a"),
                ApplicationAuthorization::revoke("b"),
            ],
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"applications": [{"id": "a"}, {"id": "b", "operation": "delete"}]})
        );
    }

    #[test]
    fn test_api_tolerates_null_applications() {
        let api: Api = serde_json::from_value(json!({
            "id": "api_1",
            "name": "Orders",
            "audience": "https://orders",
            "is_management_api": false,
            "applications": null
        }))
        .unwrap();

        assert_eq!(api.name, "Orders");
        assert!(api.applications.is_empty());
    }
}
