//! Request path formatting.
//!
//! Paths follow `<endpoint>[/<path_param>][?<key>=<value>&...]`. Values are
//! interpolated verbatim; nothing is percent-encoded here.

use std::fmt;

/// Insertion-ordered query parameters.
///
/// Order is preserved when the parameters are rendered into a path, and
/// [`QueryParams::set`] replaces an existing key in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Create an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set `key` to `value`, replacing an existing entry in place or
    /// appending a new one.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Look up the value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.set(key, value);
        }
        params
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Format a request path from an endpoint, an optional path segment and
/// query parameters.
///
/// An empty `path_param` is treated the same as `None`.
///
/// # Example
///
/// ```
/// use springserve::{format_url, QueryParams};
///
/// let query = QueryParams::new().with("page", 2).with("per", 10);
/// assert_eq!(format_url("/supply_tags", Some("42"), &query), "/supply_tags/42?page=2&per=10");
/// ```
#[must_use]
pub fn format_url(endpoint: &str, path_param: Option<&str>, query: &QueryParams) -> String {
    let mut url = endpoint.to_string();

    if let Some(param) = path_param.filter(|p| !p.is_empty()) {
        url.push('/');
        url.push_str(param);
    }

    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.to_string());
    }

    url
}
