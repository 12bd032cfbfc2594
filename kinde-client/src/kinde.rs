use kinde_core::{ApiClient, ConfigError, Credentials, ErrorClient, KindeClient, KindeError};

use crate::apis::ApisClient;
use crate::applications::ApplicationsClient;
use crate::connections::ConnectionsClient;
use crate::identities::IdentitiesClient;
use crate::organizations::OrganizationsClient;
use crate::permissions::PermissionsClient;
use crate::roles::RolesClient;
use crate::users::UsersClient;

/// Entry point to every Kinde resource.
///
/// Owns an [`ApiClient`] and hands out borrowing resource clients, all of
/// which share its token cache.
///
/// # Example
///
/// ```no_run
/// use kinde_client::Kinde;
///
/// #[tokio::main]
/// async fn main() -> Result<(), kinde_core::KindeError> {
///     let kinde = Kinde::from_env()?;
///
///     for api in kinde.apis().list().await? {
///         println!("{} {}", api.id, api.name);
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Kinde<C = KindeClient> {
    client: C,
}

impl Kinde<KindeClient> {
    /// Create a facade over a new [`KindeClient`].
    pub fn new(credentials: Credentials) -> Result<Self, KindeError> {
        Ok(Self::with_client(KindeClient::new(credentials)?))
    }

    /// Create a facade from the `KINDE_*` environment variables.
    pub fn from_env() -> Result<Self, KindeError> {
        Ok(Self::with_client(KindeClient::from_env()?))
    }
}

impl Kinde<ErrorClient> {
    /// A facade whose every call fails with `error`.
    pub fn failing(error: ConfigError) -> Self {
        Self::with_client(ErrorClient::new(error))
    }
}

impl<C: ApiClient> Kinde<C> {
    /// Wrap an existing client.
    pub fn with_client(client: C) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// APIs registered with the business.
    pub fn apis(&self) -> ApisClient<'_, C> {
        ApisClient::new(&self.client)
    }

    /// Applications.
    pub fn applications(&self) -> ApplicationsClient<'_, C> {
        ApplicationsClient::new(&self.client)
    }

    /// Authentication connections.
    pub fn connections(&self) -> ConnectionsClient<'_, C> {
        ConnectionsClient::new(&self.client)
    }

    /// User identities.
    pub fn identities(&self) -> IdentitiesClient<'_, C> {
        IdentitiesClient::new(&self.client)
    }

    /// Organizations.
    pub fn organizations(&self) -> OrganizationsClient<'_, C> {
        OrganizationsClient::new(&self.client)
    }

    /// Permissions.
    pub fn permissions(&self) -> PermissionsClient<'_, C> {
        PermissionsClient::new(&self.client)
    }

    /// Roles.
    pub fn roles(&self) -> RolesClient<'_, C> {
        RolesClient::new(&self.client)
    }

    /// Users.
    pub fn users(&self) -> UsersClient<'_, C> {
        UsersClient::new(&self.client)
    }
}
