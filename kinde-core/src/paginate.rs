//! Cursor pagination over list endpoints.

use std::marker::PhantomData;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::{ApiClient, NO_PAYLOAD, fetch};
use crate::error::KindeError;

/// A page returned by a list endpoint.
pub trait Page<T>: DeserializeOwned {
    /// Cursor for the following page; `None` or empty when this is the last.
    fn next_token(&self) -> Option<&str>;

    /// The items on this page, `None` if the server omitted them.
    fn into_items(self) -> Option<Vec<T>>;
}

/// Query options applied to every page request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginatorOptions {
    /// Value of the `sort` parameter.
    pub sort: Option<String>,

    /// Value of the `page_size` parameter.
    pub page_size: Option<u32>,
}

impl PaginatorOptions {
    /// Set the sort order.
    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Lazily fetches one page per [`next`](Paginator::next) call.
///
/// A paginator cannot be rewound; build a new one to start over.
pub struct Paginator<'a, C, T, P> {
    client: &'a C,
    endpoint: String,
    options: PaginatorOptions,
    first: bool,
    token: Option<String>,
    _page: PhantomData<fn() -> (T, P)>,
}

impl<'a, C, T, P> Paginator<'a, C, T, P>
where
    C: ApiClient,
    P: Page<T>,
{
    /// Create a paginator over `endpoint`.
    pub fn new(client: &'a C, endpoint: impl Into<String>, options: PaginatorOptions) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            options,
            first: true,
            token: None,
            _page: PhantomData,
        }
    }

    /// Whether another page may be available.
    pub fn has_next(&self) -> bool {
        self.first || self.token.is_some()
    }

    /// Fetch the next page.
    ///
    /// Returns an empty vector when the server sends no items.
    pub async fn next(&mut self) -> Result<Vec<T>, KindeError> {
        self.first = false;

        let mut query = Vec::new();
        if let Some(sort) = self.options.sort.as_ref().filter(|s| !s.is_empty()) {
            query.push(("sort", sort.clone()));
        }
        if let Some(page_size) = self.options.page_size.filter(|size| *size > 0) {
            query.push(("page_size", page_size.to_string()));
        }
        if let Some(token) = &self.token {
            query.push(("next_token", token.clone()));
        }

        let page: P = fetch(self.client, Method::GET, &self.endpoint, &query, NO_PAYLOAD).await?;

        self.token = page
            .next_token()
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        debug!(endpoint = %self.endpoint, has_next = self.token.is_some(), "fetched page");

        Ok(page.into_items().unwrap_or_default())
    }

    /// Fetch every remaining page and concatenate the items.
    pub async fn collect_all(mut self) -> Result<Vec<T>, KindeError> {
        let mut items = Vec::new();
        while self.has_next() {
            items.extend(self.next().await?);
        }
        Ok(items)
    }
}
