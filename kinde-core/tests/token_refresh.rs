//! Integration tests for the token transport.
//!
//! These tests verify that the TokenTransport correctly:
//! - Exchanges credentials when no token is cached
//! - Reuses a valid cached token
//! - Refreshes expired tokens before sending
//! - Leaves the cache untouched when a refresh fails
//! - Shares one refresh between concurrent callers

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use kinde_core::{
    CachedToken, Credentials, KindeError, TokenError, TokenTransport,
    error::AuthenticationFailure,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

const AUDIENCE: &str = "http://test";
const CLIENT_ID: &str = "123";
const CLIENT_SECRET: &str = "456";

/// Helper to create credentials pointing at the mock server.
fn test_credentials(server: &MockServer) -> Credentials {
    Credentials::new(server.uri(), AUDIENCE, CLIENT_ID, CLIENT_SECRET)
}

/// Helper to create a transport with an empty cache.
fn test_transport(server: &MockServer) -> TokenTransport {
    TokenTransport::new(test_credentials(server), reqwest::Client::new()).unwrap()
}

/// Helper to mount a token endpoint that issues `token`.
async fn mount_token_endpoint(server: &MockServer, token: &str, expires_in: i64, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=123"))
        .and(body_string_contains("client_secret=456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": expires_in,
            "token_type": "bearer",
            "scope": ""
        })))
        .expect(expected)
        .mount(server)
        .await;
}

/// Helper to mount an endpoint that only answers the given bearer token.
async fn mount_hello(server: &MockServer, token: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/hello"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "OK"})))
        .expect(expected)
        .mount(server)
        .await;
}

fn hello_request(server: &MockServer) -> reqwest::Request {
    reqwest::Client::new()
        .get(format!("{}/hello", server.uri()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_round_trip_fetches_missing_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "access_token", 3600, 1).await;
    mount_hello(&server, "access_token", 1).await;

    // An empty cached value counts as missing even before its expiry.
    let transport = test_transport(&server)
        .with_token(CachedToken::new("", Utc::now() + Duration::minutes(1)));

    let response = transport.round_trip(hello_request(&server)).await.unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_round_trip_reuses_valid_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "unused", 3600, 0).await;
    mount_hello(&server, "cached", 2).await;

    let transport = test_transport(&server)
        .with_token(CachedToken::new("cached", Utc::now() + Duration::minutes(1)));

    transport.round_trip(hello_request(&server)).await.unwrap();
    transport.round_trip(hello_request(&server)).await.unwrap();
}

#[tokio::test]
async fn test_round_trip_refreshes_expired_token() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "fresh", 3600, 1).await;
    mount_hello(&server, "fresh", 1).await;

    let transport = test_transport(&server)
        .with_token(CachedToken::new("expired token", Utc::now() - Duration::minutes(1)));

    transport.round_trip(hello_request(&server)).await.unwrap();
}

#[tokio::test]
async fn test_refresh_sets_expiry_with_margin() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "short-lived", 60, 1).await;

    let transport = test_transport(&server);
    assert!(transport.cached_expiry().await.is_none());

    let before = Utc::now();
    let token = transport.get_token().await.unwrap();
    let after = Utc::now();

    assert_eq!(token.expose(), "short-lived");
    let expiry = transport.cached_expiry().await.unwrap();
    assert!(expiry >= before + Duration::seconds(30));
    assert!(expiry <= after + Duration::seconds(30));
}

#[tokio::test]
async fn test_huge_expires_in_caches_token_until_max_instant() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, "long-lived", 9_000_000_000_000_000_000, 1).await;

    let transport = test_transport(&server);
    let token = transport.get_token().await.unwrap();

    assert_eq!(token.expose(), "long-lived");
    assert_eq!(
        transport.cached_expiry().await,
        Some(DateTime::<Utc>::MAX_UTC)
    );

    // Cached, so no second exchange.
    transport.get_token().await.unwrap();
}

#[tokio::test]
async fn test_refresh_sends_audience_and_scopes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("audience=http%3A%2F%2Ftest"))
        .and(body_string_contains("scope=read+write"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "scoped",
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let credentials = test_credentials(&server).with_scopes(["read", "write"]);
    let transport = TokenTransport::new(credentials, reqwest::Client::new()).unwrap();

    transport.refresh_token().await.unwrap();
    assert_eq!(transport.get_token().await.unwrap().expose(), "scoped");
}

#[tokio::test]
async fn test_non_bearer_refresh_keeps_cached_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "mac-token",
            "expires_in": 3600,
            "token_type": "mac"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = test_transport(&server)
        .with_token(CachedToken::new("still-valid", Utc::now() + Duration::hours(1)));

    let result = transport.refresh_token().await;
    match result {
        Err(TokenError::UnexpectedTokenType(found)) => assert_eq!(found, "mac"),
        other => panic!("Expected TokenError::UnexpectedTokenType, got {:?}", other),
    }

    assert_eq!(transport.get_token().await.unwrap().expose(), "still-valid");
}

#[tokio::test]
async fn test_rejected_refresh_keeps_cached_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client"
        })))
        .mount(&server)
        .await;

    let expiry = Utc::now() + Duration::hours(1);
    let transport =
        test_transport(&server).with_token(CachedToken::new("still-valid", expiry));

    match transport.refresh_token().await {
        Err(TokenError::UnexpectedStatus { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_client"));
        }
        other => panic!("Expected TokenError::UnexpectedStatus, got {:?}", other),
    }

    assert_eq!(transport.cached_expiry().await, Some(expiry));
}

#[tokio::test]
async fn test_unparseable_token_body_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let transport = test_transport(&server);
    assert!(matches!(
        transport.get_token().await,
        Err(TokenError::Decode(_))
    ));
    assert!(transport.cached_expiry().await.is_none());
}

#[tokio::test]
async fn test_round_trip_maps_token_failure_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("denied"))
        .mount(&server)
        .await;
    mount_hello(&server, "never", 0).await;

    let transport = test_transport(&server);
    let err = transport.round_trip(hello_request(&server)).await.unwrap_err();

    match err {
        KindeError::Authentication {
            path,
            failure: AuthenticationFailure::Token(TokenError::UnexpectedStatus { status, .. }),
            ..
        } => {
            assert_eq!(path, "/hello");
            assert_eq!(status, 401);
        }
        other => panic!("Expected KindeError::Authentication, got {:?}", other),
    }
}

#[tokio::test]
async fn test_concurrent_callers_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "access_token": "shared",
                    "expires_in": 3600,
                    "token_type": "bearer"
                }))
                .set_delay(StdDuration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let transport = Arc::new(test_transport(&server));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let transport = Arc::clone(&transport);
            tokio::spawn(async move { transport.get_token().await })
        })
        .collect();

    for handle in handles {
        let token = handle.await.unwrap().unwrap();
        assert_eq!(token.expose(), "shared");
    }
}
