//! Individual user identities.

use kinde_core::{ApiClient, KindeError, Method, NO_PAYLOAD, execute, fetch};
use serde::{Deserialize, Serialize};

use crate::users::Identity;

#[derive(Debug, Serialize)]
struct UpdateParams {
    is_primary: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IdentityResponse {
    identity: Identity,
}

/// Operations on `/api/v1/identities`.
#[derive(Debug)]
pub struct IdentitiesClient<'a, C> {
    client: &'a C,
}

impl<'a, C: ApiClient> IdentitiesClient<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &str) -> Result<Identity, KindeError> {
        let endpoint = format!("/api/v1/identities/{}", id);
        let response: IdentityResponse =
            fetch(self.client, Method::GET, &endpoint, &[], NO_PAYLOAD).await?;
        Ok(response.identity)
    }

    /// Mark an identity as the user's primary one, or clear the flag.
    pub async fn update(&self, id: &str, is_primary: bool) -> Result<Identity, KindeError> {
        let endpoint = format!("/api/v1/identities/{}", id);
        let params = UpdateParams { is_primary };
        let response: IdentityResponse =
            fetch(self.client, Method::PATCH, &endpoint, &[], Some(&params)).await?;
        Ok(response.identity)
    }

    pub async fn delete(&self, id: &str) -> Result<(), KindeError> {
        let endpoint = format!("/api/v1/identities/{}", id);
        execute(self.client, Method::DELETE, &endpoint, &[], NO_PAYLOAD).await
    }
}
