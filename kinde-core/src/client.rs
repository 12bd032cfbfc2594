//! Generic request executor.
//!
//! [`ApiClient`] is the seam every resource client is written against: one
//! method builds a request, the other executes it and classifies the answer.
//! [`KindeClient`] is the real implementation on top of [`TokenTransport`];
//! [`ErrorClient`] answers every call with a fixed configuration error.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::config::Credentials;
use crate::error::{ApiErrors, AuthenticationFailure, ConfigError, KindeError};
use crate::token::TokenTransport;

/// Query parameters for a request.
pub type Query<'a> = [(&'a str, String)];

/// Placeholder payload for requests without a body.
pub const NO_PAYLOAD: Option<&()> = None;

/// A prepared request that remembers the method and API path it was built for.
#[derive(Debug)]
pub struct ApiRequest {
    method: Method,
    path: String,
    inner: reqwest::Request,
}

impl ApiRequest {
    /// Build a request for `url`, with an optional pre-encoded JSON body.
    pub fn new(method: Method, path: impl Into<String>, url: Url, body: Option<Vec<u8>>) -> Self {
        let mut inner = reqwest::Request::new(method.clone(), url);
        if let Some(body) = body {
            *inner.body_mut() = Some(body.into());
        }

        Self {
            method,
            path: path.into(),
            inner,
        }
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// API path the request was built for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full request URL including the query.
    pub fn url(&self) -> &Url {
        self.inner.url()
    }

    /// Raw body bytes, if the request has a body.
    pub fn body(&self) -> Option<&[u8]> {
        self.inner.body().and_then(|b| b.as_bytes())
    }

    /// The underlying `reqwest` request.
    pub fn into_inner(self) -> reqwest::Request {
        self.inner
    }
}

/// A response that passed error classification.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    method: Method,
    path: String,
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    /// Wrap a status and body received for `method path`.
    pub fn new(method: Method, path: impl Into<String>, status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            method,
            path: path.into(),
            status,
            body,
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, KindeError> {
        serde_json::from_slice(&self.body).map_err(|source| KindeError::Decoding {
            method: self.method.clone(),
            path: self.path.clone(),
            status: self.status,
            source,
        })
    }
}

/// Build and execute requests against the Kinde API.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Build a request for `path`, appending `query` and encoding `payload`
    /// as the JSON body.
    fn new_request<P>(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        payload: Option<&P>,
    ) -> Result<ApiRequest, KindeError>
    where
        P: Serialize + ?Sized;

    /// Execute a request and classify the response.
    ///
    /// Returns the response only if the API reported success; decode it with
    /// [`ApiResponse::json`] or drop it when there is nothing to read.
    async fn do_request(&self, request: ApiRequest) -> Result<ApiResponse, KindeError>;
}

/// Build, execute and decode a request in one call.
pub async fn fetch<C, P, T>(
    client: &C,
    method: Method,
    path: &str,
    query: &Query<'_>,
    payload: Option<&P>,
) -> Result<T, KindeError>
where
    C: ApiClient,
    P: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let request = client.new_request(method, path, query, payload)?;
    client.do_request(request).await?.json()
}

/// Build and execute a request, ignoring the response body.
pub async fn execute<C, P>(
    client: &C,
    method: Method,
    path: &str,
    query: &Query<'_>,
    payload: Option<&P>,
) -> Result<(), KindeError>
where
    C: ApiClient,
    P: Serialize + ?Sized,
{
    let request = client.new_request(method, path, query, payload)?;
    client.do_request(request).await.map(|_| ())
}

/// Client for the Kinde management API.
///
/// Cheap to clone; clones share the token cache.
#[derive(Debug, Clone)]
pub struct KindeClient {
    transport: Arc<TokenTransport>,
}

impl KindeClient {
    /// Create a client with a default `reqwest::Client`.
    pub fn new(credentials: Credentials) -> Result<Self, KindeError> {
        Self::with_http_client(credentials, reqwest::Client::new())
    }

    /// Create a client from the `KINDE_*` environment variables.
    pub fn from_env() -> Result<Self, KindeError> {
        Self::new(Credentials::from_env())
    }

    /// Create a client over a caller-configured `reqwest::Client`.
    ///
    /// Timeouts, proxies and TLS settings come from `http`.
    pub fn with_http_client(
        credentials: Credentials,
        http: reqwest::Client,
    ) -> Result<Self, KindeError> {
        let transport = TokenTransport::new(credentials, http)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client over an existing, possibly shared, transport.
    pub fn with_transport(transport: Arc<TokenTransport>) -> Self {
        Self { transport }
    }

    /// The token transport backing this client.
    pub fn transport(&self) -> &TokenTransport {
        &self.transport
    }

    /// The configured credentials.
    pub fn credentials(&self) -> &Credentials {
        self.transport.credentials()
    }
}

#[async_trait]
impl ApiClient for KindeClient {
    fn new_request<P>(
        &self,
        method: Method,
        path: &str,
        query: &Query<'_>,
        payload: Option<&P>,
    ) -> Result<ApiRequest, KindeError>
    where
        P: Serialize + ?Sized,
    {
        let credentials = self.credentials();
        credentials.validate()?;

        let mut url = credentials.resolve(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        debug!("{} {} - url: {}", method, path, url);

        let body = payload
            .map(|payload| {
                serde_json::to_vec(payload).map_err(|source| KindeError::Serialization {
                    method: method.clone(),
                    path: path.to_string(),
                    source,
                })
            })
            .transpose()?;

        if let Some(raw) = &body {
            trace!("{} {} - request payload: {}", method, path, String::from_utf8_lossy(raw));
        }

        Ok(ApiRequest::new(method, path, url, body))
    }

    async fn do_request(&self, request: ApiRequest) -> Result<ApiResponse, KindeError> {
        let method = request.method().clone();
        let path = request.path().to_string();

        let response = self.transport.round_trip(request.into_inner()).await?;
        let status = response.status();
        debug!("{} {} - response status: {}", method, path, status.as_u16());

        let raw = response
            .bytes()
            .await
            .map_err(|source| KindeError::Transport {
                method: method.clone(),
                path: path.clone(),
                status: Some(status),
                source,
            })?;
        trace!("{} {} - response body: {}", method, path, String::from_utf8_lossy(&raw));

        classify_response(method, path, status, raw.to_vec())
    }
}

/// Classify a fully read response.
///
/// 401 is an authentication failure whatever the body says. Otherwise a
/// top-level `errors` field wins over the status, and any remaining status
/// of 400 or above is reported with the raw body.
pub fn classify_response(
    method: Method,
    path: String,
    status: StatusCode,
    body: Vec<u8>,
) -> Result<ApiResponse, KindeError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(KindeError::Authentication {
            method,
            path,
            status: Some(status),
            failure: AuthenticationFailure::Unauthorized,
        });
    }

    if let Some(errors) = structured_errors(&body) {
        let errors = serde_json::from_value::<ApiErrors>(errors).map_err(|source| {
            KindeError::Decoding {
                method: method.clone(),
                path: path.clone(),
                status,
                source,
            }
        })?;

        if !errors.is_empty() {
            return Err(KindeError::Api {
                method,
                path,
                status,
                errors,
            });
        }
    }

    if status.is_client_error() || status.is_server_error() {
        return Err(KindeError::UnexpectedStatus {
            method,
            path,
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    Ok(ApiResponse::new(method, path, status, body))
}

/// The value of a top-level, non-null `errors` field, if the body is a JSON
/// object that has one.
fn structured_errors(body: &[u8]) -> Option<Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(mut map)) => map.remove("errors").filter(|v| !v.is_null()),
        _ => None,
    }
}

/// A client that fails every call with the same configuration error.
///
/// Useful where a client must be handed out before its configuration is
/// known to be valid, and as a test double.
#[derive(Debug, Clone)]
pub struct ErrorClient {
    error: ConfigError,
}

impl ErrorClient {
    /// Create a client that always fails with `error`.
    pub fn new(error: ConfigError) -> Self {
        Self { error }
    }
}

#[async_trait]
impl ApiClient for ErrorClient {
    fn new_request<P>(
        &self,
        _method: Method,
        _path: &str,
        _query: &Query<'_>,
        _payload: Option<&P>,
    ) -> Result<ApiRequest, KindeError>
    where
        P: Serialize + ?Sized,
    {
        Err(KindeError::Configuration(self.error.clone()))
    }

    async fn do_request(&self, _request: ApiRequest) -> Result<ApiResponse, KindeError> {
        Err(KindeError::Configuration(self.error.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> KindeClient {
        KindeClient::new(Credentials::new(
            "https://acme.kinde.com",
            "https://acme.kinde.com/api",
            "id",
            "secret",
        ))
        .unwrap()
    }

    #[test]
    fn test_new_request_without_payload_has_no_body() {
        let request = client()
            .new_request(Method::GET, "/api/v1/apis", &[], NO_PAYLOAD)
            .unwrap();

        assert_eq!(*request.method(), Method::GET);
        assert_eq!(request.path(), "/api/v1/apis");
        assert_eq!(request.url().as_str(), "https://acme.kinde.com/api/v1/apis");
        assert!(request.body().is_none());
    }

    #[test]
    fn test_new_request_encodes_query_and_payload() {
        let query = [("sort", "name_asc".to_string()), ("next_token", "a b".to_string())];
        let payload = json!({"name": "api"});

        let request = client()
            .new_request(Method::POST, "api/v1/apis", &query, Some(&payload))
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://acme.kinde.com/api/v1/apis?sort=name_asc&next_token=a+b"
        );
        assert_eq!(request.body().unwrap(), br#"{"name":"api"}"#);
    }

    #[test]
    fn test_classify_unauthorized_ignores_errors_body() {
        let body = br#"{"errors":[{"code":"X","message":"y"}]}"#.to_vec();
        let err = classify_response(Method::GET, "/p".into(), StatusCode::UNAUTHORIZED, body)
            .unwrap_err();

        assert!(matches!(
            err,
            KindeError::Authentication {
                failure: AuthenticationFailure::Unauthorized,
                ..
            }
        ));
    }

    #[test]
    fn test_classify_errors_with_success_status() {
        let body = br#"{"errors":[{"code":"A","message":"a"},{"code":"B","message":"b"}]}"#.to_vec();
        let err = classify_response(Method::GET, "/p".into(), StatusCode::OK, body).unwrap_err();

        let errors = err.api_errors().unwrap();
        assert_eq!(errors.len(), 2);
        assert!(errors.has("B"));
    }

    #[test]
    fn test_classify_single_error_object() {
        let body = br#"{"errors":{"code":"A","message":"a"}}"#.to_vec();
        let err = classify_response(Method::GET, "/p".into(), StatusCode::BAD_REQUEST, body)
            .unwrap_err();

        assert_eq!(err.api_errors().unwrap().len(), 1);
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_classify_unexpected_status_keeps_body() {
        let err = classify_response(
            Method::DELETE,
            "/p".into(),
            StatusCode::INTERNAL_SERVER_ERROR,
            b"upstream down".to_vec(),
        )
        .unwrap_err();

        match err {
            KindeError::UnexpectedStatus { status, body, .. } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_classify_null_or_empty_errors_is_success() {
        for body in [r#"{"errors":null,"code":"OK"}"#, r#"{"errors":[],"code":"OK"}"#] {
            let response =
                classify_response(Method::GET, "/p".into(), StatusCode::OK, body.as_bytes().to_vec())
                    .unwrap();
            let value: Value = response.json().unwrap();
            assert_eq!(value["code"], "OK");
        }
    }

    #[test]
    fn test_classify_malformed_errors_is_decoding_error() {
        let body = br#"{"errors":"boom"}"#.to_vec();
        let err = classify_response(Method::GET, "/p".into(), StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, KindeError::Decoding { .. }));
    }

    #[test]
    fn test_response_json_reports_decoding_error() {
        let response = ApiResponse::new(Method::GET, "/p", StatusCode::OK, b"not json".to_vec());
        let err = response.json::<Value>().unwrap_err();
        assert!(matches!(err, KindeError::Decoding { .. }));
    }

    #[tokio::test]
    async fn test_error_client_fails_every_call() {
        let client = ErrorClient::new(ConfigError::MissingOptions(vec!["client_secret"]));

        let err = client
            .new_request(Method::GET, "/api/v1/apis", &[], NO_PAYLOAD)
            .unwrap_err();
        assert!(err.is_configuration());

        let request = ApiRequest::new(
            Method::GET,
            "/api/v1/apis",
            Url::parse("https://acme.kinde.com/api/v1/apis").unwrap(),
            None,
        );
        let err = client.do_request(request).await.unwrap_err();
        assert!(err.is_configuration());
    }
}
