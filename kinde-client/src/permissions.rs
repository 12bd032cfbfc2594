//! Permissions that roles grant.

use kinde_core::{
    ApiClient, KindeError, Method, NO_PAYLOAD, Page, Paginator, PaginatorOptions, StringEnum,
    execute, fetch,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::de::list_query;

const ENDPOINT: &str = "/api/v1/permissions";

/// Page size used when scanning permissions in [`PermissionsClient::search`].
const SEARCH_PAGE_SIZE: u32 = 100;

kinde_core::string_enum! {
    /// Sort order for [`PermissionsClient::list`].
    pub enum PermissionSort {
        NameAsc => "name_asc",
        NameDesc => "name_desc",
        IdAsc => "id_asc",
        IdDesc => "id_desc",
    }
}

/// A permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permission {
    pub id: String,
    pub key: String,
    pub name: String,
    pub description: String,
}

/// Parameters for [`PermissionsClient::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub sort: Option<PermissionSort>,
    pub page_size: Option<u32>,
    pub next_token: Option<String>,
}

/// Criteria for [`PermissionsClient::search`]; both must match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub name: String,
    pub key: String,
}

/// Parameters for [`PermissionsClient::create`] and [`PermissionsClient::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionParams {
    pub name: String,
    pub description: String,
    pub key: String,
}

/// One page of permissions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListResponse {
    pub code: String,
    pub message: String,
    pub next_token: Option<String>,
    pub permissions: Option<Vec<Permission>>,
}

impl Page<Permission> for ListResponse {
    fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    fn into_items(self) -> Option<Vec<Permission>> {
        self.permissions
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateResponse {
    permission: Permission,
}

/// Operations on `/api/v1/permissions`.
#[derive(Debug)]
pub struct PermissionsClient<'a, C> {
    client: &'a C,
}

impl<'a, C: ApiClient> PermissionsClient<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Fetch a single page of permissions.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<Permission>, KindeError> {
        let query = list_query(
            params.sort.as_ref().map(StringEnum::as_str),
            params.page_size,
            params.next_token.as_deref(),
        );

        let response: ListResponse =
            fetch(self.client, Method::GET, ENDPOINT, &query, NO_PAYLOAD).await?;
        Ok(response.permissions.unwrap_or_default())
    }

    /// Find the permission with the given name and key.
    ///
    /// Scans every page and fails with [`KindeError::NotFound`] when nothing matches.
    pub async fn search(&self, params: &SearchParams) -> Result<Permission, KindeError> {
        let options = PaginatorOptions::default()
            .with_sort(PermissionSort::NameAsc.as_str())
            .with_page_size(SEARCH_PAGE_SIZE);
        let mut pages: Paginator<'_, C, Permission, ListResponse> =
            Paginator::new(self.client, ENDPOINT, options);

        while pages.has_next() {
            let found = pages
                .next()
                .await?
                .into_iter()
                .find(|permission| permission.name == params.name && permission.key == params.key);
            if let Some(permission) = found {
                debug!(id = %permission.id, "found permission");
                return Ok(permission);
            }
        }

        Err(KindeError::NotFound {
            kind: "permission",
            id: format!("name {} and key {}", params.name, params.key),
        })
    }

    /// Create a permission. Only the id is reliably populated on the result.
    pub async fn create(&self, params: &PermissionParams) -> Result<Permission, KindeError> {
        let response: CreateResponse =
            fetch(self.client, Method::POST, ENDPOINT, &[], Some(params)).await?;
        Ok(response.permission)
    }

    pub async fn update(&self, id: &str, params: &PermissionParams) -> Result<(), KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        execute(self.client, Method::PATCH, &endpoint, &[], Some(params)).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }
}
