//! Pagination policies for [`Collection`](crate::Collection).
//!
//! A policy decides how the next page is requested, which response marks
//! the end of the data, and where the items sit in a page body.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::path::QueryParams;
use crate::service::Service;
use crate::transport::RawResponse;

/// How a collection fetches and reads its pages.
#[async_trait]
pub trait Paginate: Send + Sync {
    /// Request page number `page` (1-indexed).
    async fn fetch_page(
        &mut self,
        service: &Service,
        path_param: Option<&str>,
        query: &QueryParams,
        page: u32,
    ) -> Result<RawResponse>;

    /// Whether `response` signals that there is no more data.
    fn is_last_page(&self, response: &RawResponse) -> bool;

    /// The items carried by a page body.
    fn page_items(&self, body: Value) -> Vec<Value>;
}

/// GET-based pagination: the original query plus `page=<n>`.
///
/// The API does not report totals, so the end is found by requesting pages
/// until one comes back with an empty body.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPager;

#[async_trait]
impl Paginate for QueryPager {
    async fn fetch_page(
        &mut self,
        service: &Service,
        path_param: Option<&str>,
        query: &QueryParams,
        page: u32,
    ) -> Result<RawResponse> {
        let mut params = query.clone();
        params.set("page", page);
        service.get_raw(path_param, &params).await
    }

    fn is_last_page(&self, response: &RawResponse) -> bool {
        response.json().map_or(true, is_empty_json)
    }

    fn page_items(&self, body: Value) -> Vec<Value> {
        match body {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        }
    }
}

/// `null`, `[]`, `{}` and `""` count as empty.
pub fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
