//! Paginated report results.

use std::ops::Range;

use async_trait::async_trait;
use futures::Stream;
use serde_json::{Map, Value};

use crate::collection::Collection;
use crate::error::{Result, SpringServeError};
use crate::pagination::{is_empty_json, Paginate};
use crate::path::QueryParams;
use crate::response::Resource;
use crate::service::Service;
use crate::transport::RawResponse;

use super::frame::ReportFrame;

/// Report pagination: re-submit the job payload with `page=<n>`.
///
/// Reports are not paged by GET; the finished job is queried again with a
/// higher page number until a response comes back without `data`.
#[derive(Debug, Clone, Default)]
pub struct ReportPager {
    payload: Option<Map<String, Value>>,
}

impl ReportPager {
    /// A pager that re-submits `payload`.
    pub fn new(payload: Map<String, Value>) -> Self {
        Self {
            payload: Some(payload),
        }
    }

    /// The stored job payload.
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.payload.as_ref()
    }
}

#[async_trait]
impl Paginate for ReportPager {
    async fn fetch_page(
        &mut self,
        service: &Service,
        path_param: Option<&str>,
        _query: &QueryParams,
        page: u32,
    ) -> Result<RawResponse> {
        let payload = self.payload.as_mut().ok_or_else(missing_payload)?;
        payload.insert("page".to_string(), Value::from(page));
        service
            .post_raw(path_param, &*payload, &QueryParams::new())
            .await
    }

    fn is_last_page(&self, response: &RawResponse) -> bool {
        response
            .json()
            .and_then(|body| body.get("data"))
            .map_or(true, is_empty_json)
    }

    fn page_items(&self, body: Value) -> Vec<Value> {
        match body {
            Value::Object(mut fields) => match fields.remove("data") {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

fn missing_payload() -> SpringServeError {
    SpringServeError::ConfigMissing("original report parameters are missing".to_string())
}

/// The result of a completed report job.
///
/// Rows are items of an underlying [`Collection`] and can be walked with
/// [`get`](Self::get) or [`stream`](Self::stream), or viewed as a table with
/// [`to_dataframe`](Self::to_dataframe). Later pages come from
/// [`get_next_page`](Self::get_next_page) and
/// [`get_all_pages`](Self::get_all_pages).
#[derive(Debug)]
pub struct ReportCollection {
    inner: Collection<ReportPager>,
    /// First loaded row shown by the table.
    view_start: usize,
    frame: Option<(Range<usize>, ReportFrame)>,
}

impl ReportCollection {
    /// Wrap a completed report response.
    ///
    /// Without a `payload` the first page is still readable, but further
    /// pages cannot be requested.
    pub fn new(service: Service, response: Value, payload: Option<Map<String, Value>>) -> Self {
        let pager = payload.map(ReportPager::new).unwrap_or_default();
        Self {
            inner: Collection::new(service, response, None, QueryParams::new(), true, pager),
            view_start: 0,
            frame: None,
        }
    }

    /// The full body of the completed response.
    pub fn raw(&self) -> &Value {
        self.inner.raw()
    }

    pub fn report_id(&self) -> Option<&Value> {
        self.raw().get("report_id")
    }

    pub fn status(&self) -> Option<&str> {
        self.raw().get("status").and_then(Value::as_str)
    }

    /// The payload used to re-submit the job.
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.inner.pager().payload()
    }

    pub fn current_page(&self) -> u32 {
        self.inner.current_page()
    }

    pub fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }

    /// The underlying row collection.
    pub fn rows(&self) -> &Collection<ReportPager> {
        &self.inner
    }

    /// The row at `index`, fetching pages as needed.
    pub async fn get(&mut self, index: usize) -> Result<&Resource> {
        self.inner.get(index).await
    }

    /// Stream every row, paginating as it goes.
    pub fn stream(&mut self) -> impl Stream<Item = Result<Resource>> + '_ {
        self.inner.stream()
    }

    /// The loaded rows as a table.
    ///
    /// Rows fetched by [`get`](Self::get) or [`stream`](Self::stream) are
    /// included. After `get_next_page(true)` the table starts at that page.
    pub fn to_dataframe(&mut self) -> &ReportFrame {
        let range = self.view_start..self.inner.loaded_len();
        if self.frame.as_ref().is_some_and(|(cached, _)| *cached != range) {
            self.frame = None;
        }
        let loaded = self.inner.loaded();
        let (_, frame) = self.frame.get_or_insert_with(|| {
            let rows = loaded[range.clone()].iter().map(|row| row.raw().clone());
            (range, ReportFrame::from_rows(rows))
        });
        frame
    }

    /// Fetch the next page of rows.
    ///
    /// With `clear_previous` the table is replaced by the new page,
    /// otherwise the page is appended. Returns `false` once there are no
    /// more pages.
    ///
    /// # Errors
    ///
    /// [`SpringServeError::ConfigMissing`] if the collection was built
    /// without a payload; request failures.
    pub async fn get_next_page(&mut self, clear_previous: bool) -> Result<bool> {
        if self.inner.is_exhausted() {
            return Ok(false);
        }
        if self.inner.pager().payload().is_none() {
            return Err(missing_payload());
        }

        let before = self.inner.loaded_len();
        if !self.inner.fetch_next_page().await? {
            return Ok(false);
        }
        if clear_previous {
            self.view_start = before;
        }
        Ok(true)
    }

    /// Fetch every remaining page and return the table of loaded rows.
    pub async fn get_all_pages(&mut self) -> Result<&ReportFrame> {
        while self.get_next_page(false).await? {}
        Ok(self.to_dataframe())
    }
}
