//! Integration tests for cursor pagination.

use kinde_core::{Credentials, KindeClient, Page, Paginator, PaginatorOptions};
use serde::Deserialize;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param, query_param_is_missing},
};

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ItemPage {
    data: Option<Vec<Item>>,
    next_token: Option<String>,
}

impl Page<Item> for ItemPage {
    fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }

    fn into_items(self) -> Option<Vec<Item>> {
        self.data
    }
}

async fn client(server: &MockServer) -> KindeClient {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access_token",
            "expires_in": 3600,
            "token_type": "bearer"
        })))
        .mount(server)
        .await;

    KindeClient::new(Credentials::new(server.uri(), "http://test", "123", "456")).unwrap()
}

async fn mount_two_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("sort", "name_asc"))
        .and(query_param("page_size", "2"))
        .and(query_param_is_missing("next_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1"}, {"id": "2"}],
            "next_token": "T"
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("next_token", "T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "next_token": null
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn options() -> PaginatorOptions {
    PaginatorOptions::default()
        .with_sort("name_asc")
        .with_page_size(2)
}

#[tokio::test]
async fn test_paginator_follows_next_token() {
    let server = MockServer::start().await;
    let client = client(&server).await;
    mount_two_pages(&server).await;

    let mut pages: Paginator<'_, _, Item, ItemPage> = Paginator::new(&client, "/items", options());

    assert!(pages.has_next());
    let first = pages.next().await.unwrap();
    assert_eq!(first, vec![Item { id: "1".into() }, Item { id: "2".into() }]);

    assert!(pages.has_next());
    let second = pages.next().await.unwrap();
    assert!(second.is_empty());

    assert!(!pages.has_next());
}

#[tokio::test]
async fn test_collect_all_concatenates_pages() {
    let server = MockServer::start().await;
    let client = client(&server).await;
    mount_two_pages(&server).await;

    let items = Paginator::<_, Item, ItemPage>::new(&client, "/items", options())
        .collect_all()
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_zero_page_size_and_empty_sort_are_omitted() {
    let server = MockServer::start().await;
    let client = client(&server).await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param_is_missing("sort"))
        .and(query_param_is_missing("page_size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "only"}],
            "next_token": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = PaginatorOptions::default().with_sort("").with_page_size(0);
    let mut pages = Paginator::<_, Item, ItemPage>::new(&client, "/items", options);

    assert_eq!(pages.next().await.unwrap().len(), 1);
    assert!(!pages.has_next());
}

#[tokio::test]
async fn test_failed_page_propagates_error() {
    let server = MockServer::start().await;
    let client = client(&server).await;

    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let err = Paginator::<_, Item, ItemPage>::new(&client, "/items", PaginatorOptions::default())
        .collect_all()
        .await
        .unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
}
