//! Asynchronous report jobs: submit, poll until complete, then page.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde_json::{Map, Value};

use crate::error::{Result, SpringServeError};
use crate::path::QueryParams;
use crate::service::Service;
use crate::transport::Transport;

use super::collection::ReportCollection;

/// Standard report endpoint name.
pub const REPORT: &str = "report";
/// Traffic quality report endpoint name.
pub const TRAFFIC_QUALITY_REPORTS: &str = "traffic_quality_reports";
/// Status reported once a job's data is ready.
pub const COMPLETE: &str = "COMPLETE";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Report time bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Hour,
    Day,
    Cumulative,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Cumulative => "cumulative",
        }
    }
}

impl FromStr for Interval {
    type Err = SpringServeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "cumulative" => Ok(Self::Cumulative),
            other => Err(SpringServeError::InvalidInterval(other.to_string())),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A report start or end date.
///
/// Dates and date-times are sent as `YYYY-MM-DD`; strings are sent as
/// given, so `"2015-12-01 00:00:00"` keeps its time part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDate {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Formatted(String),
}

impl ReportDate {
    pub fn format(&self) -> String {
        match self {
            Self::Date(date) => date.format(DATE_FORMAT).to_string(),
            Self::DateTime(datetime) => datetime.format(DATE_FORMAT).to_string(),
            Self::Formatted(s) => s.clone(),
        }
    }
}

impl From<NaiveDate> for ReportDate {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for ReportDate {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::DateTime(datetime)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for ReportDate {
    fn from(datetime: DateTime<Tz>) -> Self {
        Self::DateTime(datetime.naive_local())
    }
}

impl From<&str> for ReportDate {
    fn from(s: &str) -> Self {
        Self::Formatted(s.to_string())
    }
}

impl From<String> for ReportDate {
    fn from(s: String) -> Self {
        Self::Formatted(s)
    }
}

/// Parameters for [`ReportingService::run`].
///
/// ```
/// use chrono::NaiveDate;
/// use springserve::ReportParams;
///
/// let params = ReportParams::new()
///     .start_date(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap())
///     .end_date("2016-01-07")
///     .interval("day")
///     .dimension("supply_tag_id")
///     .param("timezone", "UTC");
/// let payload = params.payload().unwrap();
/// assert_eq!(payload["start_date"], "2016-01-01");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReportParams {
    start_date: Option<ReportDate>,
    end_date: Option<ReportDate>,
    interval: Option<String>,
    dimensions: Vec<String>,
    account_id: Option<Value>,
    extra: Map<String, Value>,
}

impl ReportParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn start_date(mut self, date: impl Into<ReportDate>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    #[must_use]
    pub fn end_date(mut self, date: impl Into<ReportDate>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    /// One of `hour`, `day`, `cumulative`; checked when the payload is built.
    /// An empty string means no interval.
    #[must_use]
    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    #[must_use]
    pub fn dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimensions.push(dimension.into());
        self
    }

    #[must_use]
    pub fn dimensions<I, S>(mut self, dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions.extend(dimensions.into_iter().map(Into::into));
        self
    }

    /// Account to report on; `0` or an empty string means none.
    #[must_use]
    pub fn account_id(mut self, account_id: impl Into<Value>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Any other payload key, such as `timezone`, `date_range` or a filter
    /// like `supply_tag_ids`. Overrides the built-in keys.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Build the job payload.
    ///
    /// # Errors
    ///
    /// [`SpringServeError::InvalidInterval`] for an unknown interval.
    pub fn payload(&self) -> Result<Map<String, Value>> {
        let mut payload = Map::new();

        if let Some(start) = &self.start_date {
            payload.insert("start_date".to_string(), Value::String(start.format()));
        }
        if let Some(end) = &self.end_date {
            payload.insert("end_date".to_string(), Value::String(end.format()));
        }
        payload.insert("report_service".to_string(), Value::Bool(true));
        payload.insert("async".to_string(), Value::Bool(true));

        if let Some(interval) = self.interval.as_deref().filter(|i| !i.is_empty()) {
            let interval: Interval = interval.parse()?;
            payload.insert("interval".to_string(), Value::from(interval.as_str()));
        }
        if !self.dimensions.is_empty() {
            payload.insert("dimensions".to_string(), Value::from(self.dimensions.clone()));
        }
        if let Some(account_id) = self.account_id.as_ref().filter(|id| !is_unset(id)) {
            payload.insert("account_id".to_string(), account_id.clone());
        }

        payload.extend(self.extra.clone());
        Ok(payload)
    }
}

/// How long to wait between polls and how many polls to allow.
///
/// The default polls every second with no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

impl PollConfig {
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

/// Runs report jobs against a reporting endpoint.
///
/// # Example
///
/// ```no_run
/// use springserve::{ReportParams, SpringServeClient};
///
/// # async fn example() -> springserve::Result<()> {
/// let client = SpringServeClient::from_env()?;
/// let params = ReportParams::new()
///     .start_date("2016-01-01")
///     .end_date("2016-01-02")
///     .interval("hour")
///     .dimensions(["supply_tag_id", "declared_domain"]);
///
/// let mut report = client.reports().run(&params).await?;
/// let table = report.get_all_pages().await?;
/// println!("{}", table.to_table());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReportingService {
    service: Service,
    poll: PollConfig,
}

impl ReportingService {
    /// The standard `report` endpoint.
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self::from_service(Service::new(transport, REPORT))
    }

    /// The `traffic_quality_reports` endpoint.
    pub fn traffic_quality<T: Transport + 'static>(transport: T) -> Self {
        Self::from_service(Service::new(transport, TRAFFIC_QUALITY_REPORTS))
    }

    /// Run jobs through an existing service.
    pub fn from_service(service: Service) -> Self {
        Self {
            service,
            poll: PollConfig::default(),
        }
    }

    #[must_use]
    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn service(&self) -> &Service {
        &self.service
    }

    pub fn poll_config(&self) -> PollConfig {
        self.poll
    }

    /// Submit a report job and wait for it to complete.
    ///
    /// Returns the first page of results; later pages are fetched through
    /// the returned [`ReportCollection`].
    ///
    /// # Errors
    ///
    /// - [`SpringServeError::InvalidInterval`] before any request is made.
    /// - [`SpringServeError::MissingField`] if a response lacks `report_id`
    ///   or `status`.
    /// - [`SpringServeError::ApiError`] for a non-2xx response.
    /// - [`SpringServeError::PollLimitExceeded`] when `max_attempts` is set
    ///   and reached.
    #[tracing::instrument(skip(self, params), fields(endpoint = self.service.api_name()))]
    pub async fn run(&self, params: &ReportParams) -> Result<ReportCollection> {
        let payload = params.payload()?;
        self.get_report(payload).await
    }

    async fn get_report(&self, mut payload: Map<String, Value>) -> Result<ReportCollection> {
        let mut response = self.submit(&payload).await?;

        let report_id = response
            .get("report_id")
            .cloned()
            .ok_or_else(|| missing_field("report_id", &response))?;
        payload.insert("report_id".to_string(), report_id.clone());
        let mut status = status_of(&response)?;

        tracing::debug!(report_id = %report_id, %status, "report submitted");

        let mut polls = 0;
        while status != COMPLETE {
            if let Some(max_attempts) = self.poll.max_attempts {
                if polls >= max_attempts {
                    tracing::warn!(report_id = %report_id, polls, "giving up on report");
                    return Err(SpringServeError::PollLimitExceeded {
                        report_id: id_string(&report_id),
                        attempts: polls,
                    });
                }
            }

            tokio::time::sleep(self.poll.interval).await;
            response = self.submit(&payload).await?;
            status = status_of(&response)?;
            polls += 1;
            tracing::debug!(report_id = %report_id, %status, polls, "polled report");
        }

        Ok(ReportCollection::new(
            self.service.clone(),
            Value::Object(response),
            Some(payload),
        ))
    }

    async fn submit(&self, payload: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut response = self
            .service
            .post_raw(None, payload, &QueryParams::new())
            .await?
            .error_for_status()?;

        match response.take_json() {
            Some(Value::Object(body)) => Ok(body),
            other => Err(SpringServeError::MissingField {
                field: "status",
                body: other.map(|v| v.to_string()).unwrap_or_default(),
            }),
        }
    }
}

/// `null`, `false`, `0` and `""` mean the parameter was not given.
fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn status_of(response: &Map<String, Value>) -> Result<String> {
    response
        .get("status")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing_field("status", response))
}

fn missing_field(field: &'static str, response: &Map<String, Value>) -> SpringServeError {
    SpringServeError::MissingField {
        field,
        body: Value::Object(response.clone()).to_string(),
    }
}

fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
