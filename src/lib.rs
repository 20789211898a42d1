//! SpringServe API client library.
//!
//! A Rust library for the SpringServe ad-serving REST API. Every endpoint
//! is reached through a generic [`Service`] that turns `get`/`put`/`create`
//! calls into HTTP requests and wraps the JSON that comes back by shape:
//! objects become a [`Resource`], arrays become a lazily paginated
//! [`Collection`]. Reports are asynchronous jobs driven by a
//! [`ReportingService`].
//!
//! # Quick Start
//!
//! ```no_run
//! use springserve::{QueryParams, ReportParams, SpringServeClient};
//!
//! #[tokio::main]
//! async fn main() -> springserve::Result<()> {
//!     // Create client from environment variables
//!     let client = SpringServeClient::from_env()?;
//!
//!     // Fetch one supply tag and rename it
//!     let mut tag = client
//!         .supply_tags()
//!         .get(Some("1234"), &QueryParams::new())
//!         .await?
//!         .into_single()?;
//!     tag.set("name", "renamed")?;
//!     tag.save().await?;
//!
//!     // Walk every demand tag, page by page
//!     let mut tags = client
//!         .demand_tags()
//!         .get(None, &QueryParams::new())
//!         .await?
//!         .into_collection()?;
//!     println!("Found {} demand tags", tags.collect_all().await?.len());
//!
//!     // Run a report and print every page
//!     let params = ReportParams::new()
//!         .start_date("2016-01-01")
//!         .end_date("2016-01-02")
//!         .interval("day")
//!         .dimension("supply_tag_id");
//!     let mut report = client.reports().run(&params).await?;
//!     println!("{}", report.get_all_pages().await?.to_table());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Transport`] - the HTTP seam; [`SpringServeClient`] is the real one
//! - [`Service`] - CRUD accessor bound to one endpoint
//! - [`Response`] - either a [`Resource`] or a [`Collection`]
//! - [`Paginate`] - how a [`Collection`] fetches its later pages
//! - [`ReportingService`] / [`ReportCollection`] - report jobs and results
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `SPRINGSERVE_API_TOKEN` - an API token
//! - `SPRINGSERVE_EMAIL` / `SPRINGSERVE_PASSWORD` - credentials used to
//!   obtain a token when no token is set
//! - `SPRINGSERVE_API_URL` (optional) - Base URL (defaults to
//!   `https://console.springserve.com/api/v0`)

mod client;
mod collection;
mod error;
mod pagination;
mod path;
mod reporting;
mod response;
mod service;
mod transport;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

#[cfg(test)]
mod testing;

// Re-export core types
pub use client::{SpringServeClient, DEFAULT_BASE_URL};
pub use error::{Result, SpringServeError};
pub use path::{format_url, QueryParams};
pub use transport::{RawResponse, Transport};

// Re-export response wrappers
pub use collection::Collection;
pub use pagination::{is_empty_json, Paginate, QueryPager};
pub use response::{Resource, Response, RESERVED_PREFIX};

// Re-export services
pub use service::{raw_get, Service, DEMAND_TAGS, DOMAIN_LISTS, SUPPLY_TAGS};

// Re-export reporting
pub use reporting::{
    cell, Interval, PollConfig, ReportCollection, ReportDate, ReportFrame, ReportPager,
    ReportParams, ReportingService, COMPLETE, REPORT, TRAFFIC_QUALITY_REPORTS,
};
