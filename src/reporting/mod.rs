//! Reporting: asynchronous report jobs and their paginated results.

mod collection;
mod frame;
mod service;

pub use collection::{ReportCollection, ReportPager};
pub use frame::{cell, ReportFrame};
pub use service::{
    Interval, PollConfig, ReportDate, ReportParams, ReportingService, COMPLETE, REPORT,
    TRAFFIC_QUALITY_REPORTS,
};
