//! Per-endpoint CRUD accessor.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::collection::Collection;
use crate::error::Result;
use crate::pagination::QueryPager;
use crate::path::{format_url, QueryParams};
use crate::response::{Resource, Response};
use crate::transport::{RawResponse, Transport};

/// Supply tags endpoint name.
pub const SUPPLY_TAGS: &str = "supply_tags";
/// Demand tags endpoint name.
pub const DEMAND_TAGS: &str = "demand_tags";
/// Domain lists endpoint name.
pub const DOMAIN_LISTS: &str = "domain_lists";

/// Generic accessor bound to one API endpoint.
///
/// Translates `get`/`put`/`create` into HTTP requests against
/// `/<api_name>[/<path_param>]` and wraps the results by JSON shape: arrays
/// become a [`Collection`], anything else a [`Resource`].
///
/// Cloning is cheap; clones share the transport.
///
/// # Example
///
/// ```no_run
/// use springserve::{QueryParams, SpringServeClient};
///
/// # async fn example() -> springserve::Result<()> {
/// let client = SpringServeClient::from_env()?;
/// let mut tag = client.supply_tags().get(Some("1234"), &QueryParams::new()).await?.into_single()?;
/// tag.set("name", "renamed")?;
/// tag.save().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Service {
    transport: Arc<dyn Transport>,
    api_name: &'static str,
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("api_name", &self.api_name)
            .finish_non_exhaustive()
    }
}

impl Service {
    /// Bind `api_name` on the given transport.
    pub fn new<T: Transport + 'static>(transport: T, api_name: &'static str) -> Self {
        Self::from_shared(Arc::new(transport), api_name)
    }

    /// Bind `api_name` on an already shared transport.
    pub fn from_shared(transport: Arc<dyn Transport>, api_name: &'static str) -> Self {
        Self {
            transport,
            api_name,
        }
    }

    /// The endpoint name this service is bound to.
    pub fn api_name(&self) -> &'static str {
        self.api_name
    }

    /// `"/" + api_name`.
    pub fn endpoint(&self) -> String {
        format!("/{}", self.api_name)
    }

    /// The shared transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// GET without wrapping the result.
    #[tracing::instrument(skip(self), fields(endpoint = self.api_name))]
    pub async fn get_raw(
        &self,
        path_param: Option<&str>,
        query: &QueryParams,
    ) -> Result<RawResponse> {
        let path = format_url(&self.endpoint(), path_param, query);
        self.transport.get(&path).await
    }

    /// GET and wrap the result.
    pub async fn get(&self, path_param: Option<&str>, query: &QueryParams) -> Result<Response> {
        let response = self.get_raw(path_param, query).await?;
        Ok(self.build_response(response, path_param, query))
    }

    /// PUT `data` as JSON and wrap the result.
    #[tracing::instrument(skip(self, data), fields(endpoint = self.api_name))]
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path_param: Option<&str>,
        data: &B,
        query: &QueryParams,
    ) -> Result<Response> {
        let body = serde_json::to_value(data)?;
        let path = format_url(&self.endpoint(), path_param, query);
        let response = self.transport.put(&path, &body).await?;
        Ok(self.build_response(response, path_param, query))
    }

    /// POST `data` as JSON without wrapping the result.
    #[tracing::instrument(skip(self, data), fields(endpoint = self.api_name))]
    pub async fn post_raw<B: Serialize + ?Sized>(
        &self,
        path_param: Option<&str>,
        data: &B,
        query: &QueryParams,
    ) -> Result<RawResponse> {
        let body = serde_json::to_value(data)?;
        let path = format_url(&self.endpoint(), path_param, query);
        self.transport.post(&path, &body).await
    }

    /// Create an object: POST `data` as JSON and wrap the result.
    pub async fn create<B: Serialize + ?Sized>(
        &self,
        data: &B,
        path_param: Option<&str>,
        query: &QueryParams,
    ) -> Result<Response> {
        let response = self.post_raw(path_param, data, query).await?;
        Ok(self.build_response(response, path_param, query))
    }

    /// Wrap a transport response by shape.
    ///
    /// The `ok` flag is passed through; an error status does not fail here.
    pub fn build_response(
        &self,
        mut response: RawResponse,
        path_param: Option<&str>,
        query: &QueryParams,
    ) -> Response {
        let ok = response.ok();
        let path_param = path_param.map(str::to_string);

        match response.take_json() {
            Some(body @ Value::Array(_)) => Response::Collection(Collection::new(
                self.clone(),
                body,
                path_param,
                query.clone(),
                ok,
                QueryPager,
            )),
            body => Response::Single(Resource::new(
                self.clone(),
                body.unwrap_or(Value::Null),
                path_param,
                query.clone(),
                ok,
            )),
        }
    }
}

/// GET an arbitrary path relative to the API root and return its body.
///
/// ```no_run
/// use springserve::{raw_get, QueryParams, SpringServeClient};
///
/// # async fn example() -> springserve::Result<()> {
/// let client = SpringServeClient::from_env()?;
/// let accounts = raw_get(&client, Some("accounts"), &QueryParams::new()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn raw_get(
    transport: &dyn Transport,
    path_param: Option<&str>,
    query: &QueryParams,
) -> Result<Option<Value>> {
    let mut response = transport.get(&format_url("", path_param, query)).await?;
    Ok(response.take_json())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use serde_json::json;

    #[test]
    fn test_endpoint() {
        let service = Service::new(RecordingTransport::default(), SUPPLY_TAGS);
        assert_eq!(service.endpoint(), "/supply_tags");
        assert_eq!(service.api_name(), "supply_tags");
    }

    #[test]
    fn test_array_body_builds_collection() {
        let service = Service::new(RecordingTransport::default(), DEMAND_TAGS);
        let response = RawResponse::new(200, Some(json!([{"id": 1}, {"id": 2}])));

        match service.build_response(response, None, &QueryParams::new()) {
            Response::Collection(collection) => {
                assert_eq!(collection.loaded_len(), 2);
                assert!(collection.ok());
            }
            Response::Single(_) => panic!("expected a collection"),
        }
    }

    #[test]
    fn test_object_and_scalar_bodies_build_single() {
        let service = Service::new(RecordingTransport::default(), DEMAND_TAGS);
        for body in [Some(json!({"id": 1})), Some(json!("text")), Some(json!(3)), None] {
            let response = RawResponse::new(200, body);
            let built = service.build_response(response, Some("1"), &QueryParams::new());
            assert!(matches!(built, Response::Single(_)));
        }
    }

    #[test]
    fn test_error_status_is_passed_through() {
        let service = Service::new(RecordingTransport::default(), SUPPLY_TAGS);
        let response = RawResponse::new(404, Some(json!({"error": "not found"})));

        let built = service.build_response(response, Some("9"), &QueryParams::new());
        assert!(!built.ok());
        let single = built.into_single().unwrap();
        assert_eq!(single.get("error").unwrap(), "not found");
    }

    #[tokio::test]
    async fn test_requests_use_formatted_paths() {
        let transport = RecordingTransport::default();
        transport.respond(RawResponse::new(200, Some(json!({"id": 5}))));
        transport.respond(RawResponse::new(200, Some(json!({"id": 5}))));
        transport.respond(RawResponse::new(201, Some(json!({"id": 6}))));
        let service = Service::new(transport.clone(), DOMAIN_LISTS);

        let query = QueryParams::new().with("account_id", 3);
        service.get(Some("5"), &query).await.unwrap();
        service.put(Some("5"), &json!({"name": "x"}), &QueryParams::new()).await.unwrap();
        service.create(&json!({"name": "y"}), None, &QueryParams::new()).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].method, "GET");
        assert_eq!(calls[0].path, "/domain_lists/5?account_id=3");
        assert_eq!(calls[1].method, "PUT");
        assert_eq!(calls[1].path, "/domain_lists/5");
        assert_eq!(calls[1].body, Some(json!({"name": "x"})));
        assert_eq!(calls[2].method, "POST");
        assert_eq!(calls[2].path, "/domain_lists");
    }

    #[tokio::test]
    async fn test_raw_get_uses_api_root() {
        let transport = RecordingTransport::default();
        transport.respond(RawResponse::new(200, Some(json!([1, 2]))));

        let body = raw_get(&transport, Some("accounts"), &QueryParams::new().with("page", 1))
            .await
            .unwrap();

        assert_eq!(body, Some(json!([1, 2])));
        assert_eq!(transport.calls()[0].path, "/accounts?page=1");
    }
}
