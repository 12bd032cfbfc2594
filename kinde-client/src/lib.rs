//! Kinde Client Library
//!
//! Typed clients for the resources of the Kinde management API, built on the
//! token transport and request executor in [`kinde_core`].
//!
//! # Overview
//!
//! Every resource lives in its own module with its types, parameters and a
//! client borrowing an [`ApiClient`](kinde_core::ApiClient):
//!
//! - [`apis`] - APIs and the applications authorized to call them
//! - [`applications`] - applications, with cursor pagination
//! - [`organizations`] - organizations and their members' roles
//! - [`users`] - users and their identities
//! - [`roles`] - roles and the permissions they grant
//! - [`permissions`] - permissions, including search by name and key
//! - [`connections`] - authentication connections
//! - [`identities`] - single identities
//!
//! [`Kinde`] bundles them behind one owned client.
//!
//! # Quick Start
//!
//! ```no_run
//! use kinde_client::Kinde;
//! use kinde_client::applications::{ApplicationType, CreateParams};
//! use kinde_core::Credentials;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), kinde_core::KindeError> {
//!     let kinde = Kinde::new(Credentials::new(
//!         "https://acme.kinde.com",
//!         "https://acme.kinde.com/api",
//!         "client-id",
//!         "client-secret",
//!     ))?;
//!
//!     let app = kinde
//!         .applications()
//!         .create(&CreateParams {
//!             name: "Billing".into(),
//!             kind: ApplicationType::MachineToMachine,
//!         })
//!         .await?;
//!     println!("created {}", app.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! Resource clients are generic over [`ApiClient`](kinde_core::ApiClient), so
//! code written against them can be exercised with
//! [`ErrorClient`](kinde_core::ErrorClient) or any other implementation.

pub mod apis;
pub mod applications;
pub mod connections;
mod de;
pub mod identities;
mod kinde;
pub mod organizations;
pub mod permissions;
pub mod roles;
pub mod users;

pub use kinde::Kinde;

pub use apis::ApisClient;
pub use applications::ApplicationsClient;
pub use connections::ConnectionsClient;
pub use identities::IdentitiesClient;
pub use organizations::OrganizationsClient;
pub use permissions::PermissionsClient;
pub use roles::RolesClient;
pub use users::UsersClient;
