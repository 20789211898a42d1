//! Output formatting for CLI display.
//!
//! Provides the [`PrettyPrint`] trait for human-readable output
//! as an alternative to JSON serialization.

use serde_json::Value;
use tabled::Table;

use crate::reporting::{cell, ReportFrame};
use crate::response::Resource;

/// Trait for human-readable output.
///
/// Implemented by wrapper types to provide formatted output
/// suitable for terminal display when `--json` is not specified.
pub trait PrettyPrint {
    /// Returns a formatted string for terminal display.
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Resource {
    fn pretty_print(&self) -> String {
        let header = match self.id() {
            Some(id) => format!("{} {}", self.service().api_name(), id),
            None => self.service().api_name().to_string(),
        };
        let divider = "─".repeat(header.chars().count().max(30));
        let mut lines = vec![header, divider];

        match self.raw() {
            Value::Object(fields) => {
                let width = fields.keys().map(|k| k.chars().count()).max().unwrap_or(0);
                for (key, value) in fields {
                    lines.push(format!("{:<width$}  {}", format!("{key}:"), cell(value), width = width + 1));
                }
            }
            other => lines.push(cell(other)),
        }

        if !self.ok() {
            lines.push("(request failed)".to_string());
        }

        lines.join("\n")
    }
}

impl PrettyPrint for ReportFrame {
    fn pretty_print(&self) -> String {
        if self.is_empty() {
            return "(no rows)".to_string();
        }
        format!("{}\n\n{} rows", self.to_table(), self.len())
    }
}

/// A table with one row per item and the union of their fields as columns.
pub fn resource_table(items: &[Resource]) -> Table {
    ReportFrame::from_rows(items.iter().map(|item| item.raw().clone())).to_table()
}
