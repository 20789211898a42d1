//! SpringServe API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Higher-level operations go through [`Service`] and [`ReportingService`],
//! which use this client as their [`Transport`].

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use url::Url;

use crate::error::{Result, SpringServeError};
use crate::reporting::ReportingService;
use crate::service::{Service, DEMAND_TAGS, DOMAIN_LISTS, SUPPLY_TAGS};
use crate::transport::{RawResponse, Transport};

/// Base URL used when `SPRINGSERVE_API_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "https://console.springserve.com/api/v0";
const USER_AGENT: &str = concat!("springserve-rs/", env!("CARGO_PKG_VERSION"));

/// Low-level SpringServe API client.
///
/// Handles authentication and HTTP requests. Endpoint-specific operations
/// live on [`Service`], constructed from a client with [`Self::service`] or
/// one of the named shortcuts.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use springserve::SpringServeClient;
///
/// # async fn example() -> springserve::Result<()> {
/// // Create from environment variables
/// let client = SpringServeClient::from_env()?;
///
/// // Or configure manually
/// let client = SpringServeClient::new("your-api-token", "https://console.springserve.com/api/v0")?;
///
/// // Or exchange credentials for a token
/// let client = SpringServeClient::login("me@example.com", "secret", "https://console.springserve.com/api/v0").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SpringServeClient {
    http: Client,
    base_url: Arc<Url>,
    token: String,
}

impl std::fmt::Debug for SpringServeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpringServeClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SpringServeClient {
    /// Create a client from environment variables.
    ///
    /// Uses `SPRINGSERVE_API_TOKEN` for authentication and optionally
    /// `SPRINGSERVE_API_URL` for the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `SPRINGSERVE_API_TOKEN` is not set.
    pub fn from_env() -> Result<Self> {
        let token = env::var("SPRINGSERVE_API_TOKEN").map_err(|_| {
            SpringServeError::ConfigMissing(
                "SPRINGSERVE_API_TOKEN environment variable not set".to_string(),
            )
        })?;

        Self::new(&token, &base_url_from_env())
    }

    /// Create a client from the environment, logging in with
    /// `SPRINGSERVE_EMAIL` and `SPRINGSERVE_PASSWORD` when no token is set.
    pub async fn from_env_or_login() -> Result<Self> {
        if env::var("SPRINGSERVE_API_TOKEN").is_ok() {
            return Self::from_env();
        }

        let (email, password) = match (env::var("SPRINGSERVE_EMAIL"), env::var("SPRINGSERVE_PASSWORD")) {
            (Ok(email), Ok(password)) => (email, password),
            _ => {
                return Err(SpringServeError::ConfigMissing(
                    "set SPRINGSERVE_API_TOKEN, or SPRINGSERVE_EMAIL and SPRINGSERVE_PASSWORD"
                        .to_string(),
                ))
            }
        };

        Self::login(&email, &password, &base_url_from_env()).await
    }

    /// Create a new client with the provided token and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(SpringServeError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: token.to_string(),
        })
    }

    /// Exchange an email and password for an API token.
    ///
    /// # Errors
    ///
    /// Returns [`SpringServeError::ApiError`] if the credentials are rejected
    /// and [`SpringServeError::MissingField`] if no token comes back.
    #[tracing::instrument(skip(password))]
    pub async fn login(email: &str, password: &str, base_url: &str) -> Result<Self> {
        let mut client = Self::new("", base_url)?;
        let body = json!({ "email": email, "password": password });

        let mut response = client.post("auth", &body).await?.error_for_status()?;
        let token = match response.take_json() {
            Some(Value::Object(mut map)) => match map.remove("token") {
                Some(Value::String(token)) => token,
                _ => {
                    return Err(SpringServeError::MissingField {
                        field: "token",
                        body: Value::Object(map).to_string(),
                    })
                }
            },
            other => {
                return Err(SpringServeError::MissingField {
                    field: "token",
                    body: other.map(|v| v.to_string()).unwrap_or_default(),
                })
            }
        };

        tracing::debug!("logged in to SpringServe");
        client.token = token;
        Ok(client)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// A [`Service`] bound to `api_name` on this client.
    pub fn service(&self, api_name: &'static str) -> Service {
        Service::new(self.clone(), api_name)
    }

    /// Supply tags endpoint.
    pub fn supply_tags(&self) -> Service {
        self.service(SUPPLY_TAGS)
    }

    /// Demand tags endpoint.
    pub fn demand_tags(&self) -> Service {
        self.service(DEMAND_TAGS)
    }

    /// Domain lists endpoint.
    pub fn domain_lists(&self) -> Service {
        self.service(DOMAIN_LISTS)
    }

    /// Standard reporting endpoint.
    pub fn reports(&self) -> ReportingService {
        ReportingService::new(self.clone())
    }

    /// Traffic quality reporting endpoint.
    pub fn traffic_quality_reports(&self) -> ReportingService {
        ReportingService::traffic_quality(self.clone())
    }

    fn url(&self, path: &str) -> Result<Url> {
        // Endpoints are formatted with a leading slash; joining that would
        // drop the base path.
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            request
        } else {
            request.header(AUTHORIZATION, &self.token)
        }
    }

    /// Send a request and read the body.
    async fn send(&self, request: RequestBuilder) -> Result<RawResponse> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(SpringServeError::HttpError)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(SpringServeError::HttpError)?;

        if !(200..300).contains(&status) {
            tracing::debug!(status, "request returned error status");
        }

        RawResponse::from_body(status, &body)
    }
}

#[async_trait]
impl Transport for SpringServeClient {
    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    async fn get(&self, path: &str) -> Result<RawResponse> {
        let url = self.url(path)?;
        self.send(self.http.get(url)).await
    }

    /// Make a PUT request with JSON body.
    #[tracing::instrument(skip(self, body))]
    async fn put(&self, path: &str, body: &Value) -> Result<RawResponse> {
        let url = self.url(path)?;
        self.send(self.http.put(url).json(body)).await
    }

    /// Make a POST request with JSON body.
    #[tracing::instrument(skip(self, body))]
    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse> {
        let url = self.url(path)?;
        self.send(self.http.post(url).json(body)).await
    }
}

fn base_url_from_env() -> String {
    env::var("SPRINGSERVE_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}
