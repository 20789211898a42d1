//! CLI argument parsing types.
//!
//! This module provides the command-line interface structure for the springserve binary.

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use crate::client::DEFAULT_BASE_URL;
use crate::service::{DEMAND_TAGS, DOMAIN_LISTS, SUPPLY_TAGS};

/// SpringServe API command-line interface.
#[derive(Parser, Debug)]
#[command(name = "springserve", about = "SpringServe API CLI", version)]
pub struct Cli {
    /// Output results as JSON instead of a table.
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// API token; when absent, email and password are used to log in.
    #[arg(long, global = true, env = "SPRINGSERVE_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Login email, used only without a token.
    #[arg(long, global = true, env = "SPRINGSERVE_EMAIL")]
    pub email: Option<String>,

    /// Login password, used only without a token.
    #[arg(long, global = true, env = "SPRINGSERVE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// API base URL.
    #[arg(long, global = true, env = "SPRINGSERVE_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Get one object by ID, or list every object of a type.
    Get {
        /// The type of entity to get.
        entity: Entity,

        /// The object ID; omit to list.
        id: Option<String>,

        /// Extra query parameter, as key=value.
        #[arg(short, long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },

    /// Set fields on an object and save it.
    Update {
        /// The type of entity to update.
        entity: Entity,

        /// The ID of the object to update.
        id: String,

        /// Field to set, as key=value. Values are parsed as JSON when possible.
        #[arg(long = "set", value_parser = parse_assignment, required = true)]
        set: Vec<(String, Value)>,
    },

    /// Create an object.
    Create {
        /// The type of entity to create.
        entity: Entity,

        /// Field to set, as key=value. Values are parsed as JSON when possible.
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, Value)>,
    },

    /// Run a report and wait for it to complete.
    Report {
        /// Which reporting endpoint to use.
        #[arg(long, value_enum, default_value_t = ReportKind::Standard)]
        kind: ReportKind,

        /// First day of the report, e.g. 2016-01-01.
        #[arg(long)]
        start_date: Option<String>,

        /// Last day of the report.
        #[arg(long)]
        end_date: Option<String>,

        /// One of hour, day, cumulative.
        #[arg(long)]
        interval: Option<String>,

        /// Dimension to group by; repeatable.
        #[arg(long = "dimension")]
        dimensions: Vec<String>,

        /// Account to report on.
        #[arg(long)]
        account_id: Option<u64>,

        /// Extra payload parameter, as key=value.
        #[arg(short = 'p', long = "param", value_parser = parse_assignment)]
        params: Vec<(String, Value)>,

        /// Fetch every page instead of just the first.
        #[arg(long)]
        all_pages: bool,

        /// Give up after this many status polls.
        #[arg(long)]
        max_polls: Option<u32>,
    },
}

/// Entity types that can be operated on.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A supply tag.
    #[value(alias = "supply-tags")]
    SupplyTag,
    /// A demand tag.
    #[value(alias = "demand-tags")]
    DemandTag,
    /// A domain list.
    #[value(alias = "domain-lists")]
    DomainList,
}

impl Entity {
    /// The endpoint name for this entity type.
    pub fn api_name(self) -> &'static str {
        match self {
            Self::SupplyTag => SUPPLY_TAGS,
            Self::DemandTag => DEMAND_TAGS,
            Self::DomainList => DOMAIN_LISTS,
        }
    }
}

/// Reporting endpoints.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportKind {
    /// The standard `report` endpoint.
    Standard,
    /// The `traffic_quality_reports` endpoint.
    TrafficQuality,
}

/// Split `key=value` at the first `=`.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}

/// `key=value` with the value read as JSON, or kept as a string when it
/// is not valid JSON.
pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
    let (key, value) = parse_key_value(s)?;
    Ok((key, parse_value(&value)))
}

/// `42` is a number, `true` a bool, `[1,2]` an array; `hello` stays a string.
pub fn parse_value(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))
}
