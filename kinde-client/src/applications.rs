//! Applications that authenticate against Kinde.

use kinde_core::{
    ApiClient, KindeError, Method, NO_PAYLOAD, Page, Paginator, PaginatorOptions, StringEnum,
    execute, fetch,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::de::{list_query, null_as_default};

const ENDPOINT: &str = "/api/v1/applications";

kinde_core::string_enum! {
    /// Kind of application.
    pub enum ApplicationType {
        /// Back-end web application.
        Regular => "reg",
        /// Front-end single page application.
        SinglePage => "spa",
        /// Machine-to-machine application.
        MachineToMachine => "m2m",
    }
}

kinde_core::string_enum! {
    /// Sort order for [`ApplicationsClient::list`].
    pub enum ApplicationSort {
        NameAsc => "name_asc",
        NameDesc => "name_desc",
    }
}

/// An application registered in Kinde.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<ApplicationType>,
    pub client_id: String,
    pub client_secret: String,
    pub login_uri: String,
    pub homepage_uri: String,
    #[serde(deserialize_with = "null_as_default")]
    pub logout_uris: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub redirect_uris: Vec<String>,
}

/// Parameters for [`ApplicationsClient::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub sort: Option<ApplicationSort>,
    pub page_size: Option<u32>,
    pub next_token: Option<String>,
}

/// Parameters for [`ApplicationsClient::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateParams {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ApplicationType,
}

/// Parameters for [`ApplicationsClient::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logout_uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uris: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage_uri: Option<String>,
}

/// One page of applications.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListResponse {
    pub code: String,
    pub message: String,
    pub next_token: Option<String>,
    pub applications: Option<Vec<Application>>,
}

impl Page<Application> for ListResponse {
    fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    fn into_items(self) -> Option<Vec<Application>> {
        self.applications
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SingleResponse {
    application: Application,
}

/// Operations on `/api/v1/applications`.
#[derive(Debug)]
pub struct ApplicationsClient<'a, C> {
    client: &'a C,
}

impl<'a, C: ApiClient> ApplicationsClient<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Fetch a single page of applications.
    ///
    /// Only `id`, `name` and `type` are populated on listed applications.
    pub async fn list(&self, params: &ListParams) -> Result<Vec<Application>, KindeError> {
        let query = list_query(
            params.sort.as_ref().map(StringEnum::as_str),
            params.page_size,
            params.next_token.as_deref(),
        );

        let response: ListResponse =
            fetch(self.client, Method::GET, ENDPOINT, &query, NO_PAYLOAD).await?;
        Ok(response.applications.unwrap_or_default())
    }

    /// Walk every page of applications.
    pub fn paginate(
        &self,
        options: PaginatorOptions,
    ) -> Paginator<'a, C, Application, ListResponse> {
        Paginator::new(self.client, ENDPOINT, options)
    }

    /// Create an application.
    ///
    /// Single page applications come back without a client secret.
    pub async fn create(&self, params: &CreateParams) -> Result<Application, KindeError> {
        let response: SingleResponse =
            fetch(self.client, Method::POST, ENDPOINT, &[], Some(params)).await?;
        debug!(id = %response.application.id, kind = %params.kind, "created application");
        Ok(response.application)
    }

    pub async fn get(&self, id: &str) -> Result<Application, KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        let response: SingleResponse =
            fetch(self.client, Method::GET, &endpoint, &[], NO_PAYLOAD).await?;
        Ok(response.application)
    }

    /// Update an application. The API returns nothing useful, so neither does this.
    pub async fn update(&self, id: &str, params: &UpdateParams) -> Result<(), KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        execute(self.client, Method::PATCH, &endpoint, &[], Some(params)).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), KindeError> {
        let endpoint = format!("{}/{}", ENDPOINT, id);
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }
}
