//! Lazily paginated collections.

use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use serde_json::Value;

use crate::error::{Result, SpringServeError};
use crate::pagination::{Paginate, QueryPager};
use crate::path::QueryParams;
use crate::response::Resource;
use crate::service::Service;

/// An array response whose later pages are fetched on demand.
///
/// The first page is materialized when the collection is built. Indexing
/// past the loaded items fetches further pages until the index is covered
/// or a page signals the end; from then on the collection is exhausted and
/// makes no more requests.
///
/// # Example
///
/// ```no_run
/// use futures::TryStreamExt;
/// use springserve::{QueryParams, SpringServeClient};
///
/// # async fn example() -> springserve::Result<()> {
/// let client = SpringServeClient::from_env()?;
/// let mut tags = client.supply_tags().get(None, &QueryParams::new()).await?.into_collection()?;
///
/// let tenth = tags.get(9).await?.id();
/// let all: Vec<_> = tags.stream().try_collect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Collection<P = QueryPager> {
    service: Service,
    raw: Value,
    path_param: Option<String>,
    query: QueryParams,
    ok: bool,
    cache: Vec<Resource>,
    current_page: u32,
    all_pages_gotten: bool,
    pager: P,
}

impl<P: Paginate> Collection<P> {
    /// Build a collection from its first page.
    pub fn new(
        service: Service,
        raw: Value,
        path_param: Option<String>,
        query: QueryParams,
        ok: bool,
        pager: P,
    ) -> Self {
        let items = pager.page_items(raw.clone());
        let mut collection = Self {
            service,
            raw,
            path_param,
            query,
            ok,
            cache: Vec::with_capacity(items.len()),
            current_page: 1,
            all_pages_gotten: false,
            pager,
        };
        collection.materialize(items);
        collection
    }

    /// Whether the first response was successful.
    pub fn ok(&self) -> bool {
        self.ok
    }

    /// The raw body of the first page.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn path_param(&self) -> Option<&str> {
        self.path_param.as_deref()
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn pager(&self) -> &P {
        &self.pager
    }

    /// The last page that returned data.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// True once a page has signalled the end of the data.
    pub fn is_exhausted(&self) -> bool {
        self.all_pages_gotten
    }

    /// Items fetched so far.
    pub fn loaded(&self) -> &[Resource] {
        &self.cache
    }

    pub fn loaded_len(&self) -> usize {
        self.cache.len()
    }

    /// Append one [`Resource`] per item, in order.
    pub fn materialize(&mut self, items: Vec<Value>) {
        let service = &self.service;
        let path_param = &self.path_param;
        let query = &self.query;
        self.cache.extend(items.into_iter().map(|item| {
            Resource::new(service.clone(), item, path_param.clone(), query.clone(), true)
        }));
    }

    /// Fetch the page after [`current_page`](Self::current_page).
    ///
    /// Returns `false` without a request once exhausted, and `false` when
    /// the fetched page is the end marker; the cache is only touched when a
    /// page carries data.
    ///
    /// # Errors
    ///
    /// Transport failures, and [`SpringServeError::ApiError`] for a non-2xx
    /// page.
    pub async fn fetch_next_page(&mut self) -> Result<bool> {
        if self.all_pages_gotten {
            return Ok(false);
        }

        let page = self.current_page + 1;
        tracing::debug!(endpoint = self.service.api_name(), page, "fetching next page");

        let mut response = self
            .pager
            .fetch_page(&self.service, self.path_param.as_deref(), &self.query, page)
            .await?
            .error_for_status()?;

        if self.pager.is_last_page(&response) {
            tracing::debug!(endpoint = self.service.api_name(), page, "all pages fetched");
            self.all_pages_gotten = true;
            return Ok(false);
        }

        let items = self
            .pager
            .page_items(response.take_json().unwrap_or(Value::Null));
        self.materialize(items);
        self.current_page = page;
        Ok(true)
    }

    /// The item at `index`, fetching pages as needed.
    ///
    /// # Errors
    ///
    /// [`SpringServeError::IndexOutOfRange`] once every page has been
    /// fetched and `index` is still past the end; page fetch failures.
    pub async fn get(&mut self, index: usize) -> Result<&Resource> {
        while index >= self.cache.len() {
            if self.all_pages_gotten {
                return Err(SpringServeError::IndexOutOfRange {
                    index,
                    len: self.cache.len(),
                });
            }
            self.fetch_next_page().await?;
        }
        Ok(&self.cache[index])
    }

    /// Stream every item from index 0, paginating as it goes.
    ///
    /// The stream ends after the last item; each call starts over at 0.
    pub fn stream(&mut self) -> impl Stream<Item = Result<Resource>> + '_ {
        try_stream! {
            let mut index = 0;
            loop {
                let item = match self.get(index).await {
                    Ok(item) => item.clone(),
                    Err(SpringServeError::IndexOutOfRange { .. }) => break,
                    Err(e) => Err(e)?,
                };
                yield item;
                index += 1;
            }
        }
    }

    /// Drain [`stream`](Self::stream) into a vector.
    pub async fn collect_all(&mut self) -> Result<Vec<Resource>> {
        self.stream().try_collect().await
    }
}
