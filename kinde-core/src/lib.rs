//! # Kinde Core
//!
//! Core library for talking to the Kinde management API.
//!
//! This crate provides:
//! - [`Credentials`] - Client-credentials configuration, from code or the environment
//! - [`TokenTransport`] - Cached, lazily refreshed bearer tokens on every request
//! - [`ApiClient`] / [`KindeClient`] - Request building, execution and error classification
//! - [`Paginator`] - Cursor pagination over list endpoints
//! - [`StringEnum`] - Closed string enums with membership validation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kinde_core::{ApiClient, Credentials, KindeClient, Method, NO_PAYLOAD};
//!
//! async fn list_apis() -> Result<serde_json::Value, kinde_core::KindeError> {
//!     let client = KindeClient::new(Credentials::from_env())?;
//!     let request = client.new_request(Method::GET, "/api/v1/apis", &[], NO_PAYLOAD)?;
//!     client.do_request(request).await?.json()
//! }
//! ```

pub mod client;
pub mod config;
pub mod enums;
pub mod error;
pub mod paginate;
pub mod secret;
pub mod token;

pub use client::{
    ApiClient,
    ApiRequest,
    ApiResponse,
    ErrorClient,
    KindeClient,
    NO_PAYLOAD,
    Query,
    execute,
    fetch,
};

pub use config::Credentials;

pub use enums::{
    InvalidEnumMember,
    StringEnum,
    validate,
};

pub use error::{
    ApiError,
    ApiErrors,
    AuthenticationFailure,
    ConfigError,
    KindeError,
};

pub use paginate::{
    Page,
    Paginator,
    PaginatorOptions,
};

pub use secret::Secret;

pub use token::{
    CachedToken,
    TokenError,
    TokenTransport,
};

pub use reqwest::Method;

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
