//! Wrappers around API responses.
//!
//! A [`Resource`] presents one JSON object as a set of named fields that can
//! be read, changed and saved back. A [`Response`] is what a [`Service`]
//! call returns: either a single [`Resource`] or a paginated
//! [`Collection`], decided once from the shape of the body.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::collection::Collection;
use crate::error::{Result, SpringServeError};
use crate::path::QueryParams;
use crate::service::Service;

/// Prefix marking names that live on the wrapper instead of the payload.
pub const RESERVED_PREFIX: char = '_';

/// A single API object.
///
/// Field names starting with `_` are local to the wrapper and never sent to
/// the API. Every other name reads from and writes to the raw JSON body, so
/// a field can be changed with [`set`](Self::set) and persisted with
/// [`save`](Self::save).
#[derive(Debug, Clone)]
pub struct Resource {
    service: Service,
    raw: Value,
    path_param: Option<String>,
    query: QueryParams,
    ok: bool,
    local: Map<String, Value>,
    dirty: BTreeSet<String>,
}

impl Resource {
    /// Wrap a response body.
    pub fn new(
        service: Service,
        raw: Value,
        path_param: Option<String>,
        query: QueryParams,
        ok: bool,
    ) -> Self {
        Self {
            service,
            raw,
            path_param,
            query,
            ok,
            local: Map::new(),
            dirty: BTreeSet::new(),
        }
    }

    /// Whether the response that produced this object was successful.
    pub fn ok(&self) -> bool {
        self.ok
    }

    /// The raw JSON body.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Consume the wrapper, returning the raw JSON body.
    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// The path parameter used to fetch this object.
    pub fn path_param(&self) -> Option<&str> {
        self.path_param.as_deref()
    }

    /// The query parameters used to fetch this object.
    pub fn query_params(&self) -> &QueryParams {
        &self.query
    }

    /// The service this object belongs to.
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Look up a key in the raw JSON body.
    pub fn get(&self, key: &str) -> Result<&Value> {
        self.raw
            .get(key)
            .ok_or_else(|| SpringServeError::FieldNotFound(key.to_string()))
    }

    /// Read a field by name.
    ///
    /// Reserved names come from the wrapper's local attributes first and
    /// fall back to the raw JSON body, so API fields like `_links` stay
    /// readable. Everything else reads the raw JSON body.
    pub fn field(&self, name: &str) -> Result<&Value> {
        if is_reserved(name) {
            if let Some(value) = self.local.get(name) {
                return Ok(value);
            }
        }
        self.get(name)
    }

    /// Read a field and deserialize it.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        Ok(T::deserialize(self.field(name)?)?)
    }

    /// Write a field by name.
    ///
    /// Reserved names are stored on the wrapper. Other names are written
    /// into the raw JSON body and marked dirty; an empty body becomes an
    /// object first.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if is_reserved(name) {
            self.local.insert(name.to_string(), value);
            return Ok(());
        }

        if self.raw.is_null() {
            self.raw = Value::Object(Map::new());
        }
        let Value::Object(fields) = &mut self.raw else {
            return Err(SpringServeError::NotAnObject(name.to_string()));
        };
        fields.insert(name.to_string(), value);
        self.dirty.insert(name.to_string());
        Ok(())
    }

    /// Names of raw fields written since this wrapper was built.
    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Keys of the raw JSON body; empty if the body is not an object.
    pub fn list_fields(&self) -> Vec<&str> {
        match &self.raw {
            Value::Object(fields) => fields.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// The object's `id` rendered as a path segment.
    pub fn id(&self) -> Option<String> {
        match self.raw.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// PUT the raw body back to `<endpoint>/<id>`.
    ///
    /// Returns the server-confirmed object; this wrapper is left unchanged.
    ///
    /// # Errors
    ///
    /// [`SpringServeError::MissingId`] if the body has no usable `id`, or
    /// whatever the PUT request fails with.
    pub async fn save(&self) -> Result<Response> {
        let id = self.id().ok_or(SpringServeError::MissingId)?;
        tracing::debug!(endpoint = self.service.api_name(), %id, "saving object");
        self.service
            .put(Some(&id), &self.raw, &QueryParams::new())
            .await
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// A wrapped response, resolved once from the body's shape.
#[derive(Debug)]
pub enum Response {
    /// The body was anything but an array.
    Single(Resource),
    /// The body was an array; further pages are fetched on demand.
    Collection(Collection),
}

impl Response {
    /// Whether the HTTP status was 2xx.
    pub fn ok(&self) -> bool {
        match self {
            Self::Single(resource) => resource.ok(),
            Self::Collection(collection) => collection.ok(),
        }
    }

    /// The raw JSON body of the first response.
    pub fn raw(&self) -> &Value {
        match self {
            Self::Single(resource) => resource.raw(),
            Self::Collection(collection) => collection.raw(),
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// Unwrap a single object.
    ///
    /// # Errors
    ///
    /// [`SpringServeError::UnexpectedShape`] if the body was an array.
    pub fn into_single(self) -> Result<Resource> {
        match self {
            Self::Single(resource) => Ok(resource),
            Self::Collection(_) => Err(SpringServeError::UnexpectedShape { expected: "single" }),
        }
    }

    /// Unwrap a collection.
    ///
    /// # Errors
    ///
    /// [`SpringServeError::UnexpectedShape`] if the body was not an array.
    pub fn into_collection(self) -> Result<Collection> {
        match self {
            Self::Collection(collection) => Ok(collection),
            Self::Single(_) => Err(SpringServeError::UnexpectedShape {
                expected: "collection",
            }),
        }
    }
}
