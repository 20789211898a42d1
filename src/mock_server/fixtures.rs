//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use serde_json::{json, Value};

use crate::service::{DEMAND_TAGS, DOMAIN_LISTS, SUPPLY_TAGS};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Tag Fixtures
    // =========================================================================

    /// Create a supply tag with the fields most callers touch.
    pub fn supply_tag(id: u64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "account_id": 1,
            "active": true,
            "rate": 1.25,
            "demand_tag_priorities": [],
        })
    }

    /// Create `count` supply tags numbered from 1.
    pub fn supply_tags(count: u64) -> Vec<Value> {
        (1..=count)
            .map(|id| Self::supply_tag(id, &format!("Supply Tag {id}")))
            .collect()
    }

    /// Create a demand tag.
    pub fn demand_tag(id: u64, name: &str, rate: f64) -> Value {
        json!({
            "id": id,
            "name": name,
            "account_id": 1,
            "active": true,
            "rate": rate,
            "vast_endpoint_url": format!("https://ads.example.com/vast/{id}"),
        })
    }

    // =========================================================================
    // Domain List Fixtures
    // =========================================================================

    /// Create a domain list.
    pub fn domain_list(id: u64, name: &str, domains: &[&str]) -> Value {
        json!({
            "id": id,
            "name": name,
            "account_id": 1,
            "domains": domains,
        })
    }

    // =========================================================================
    // Report Fixtures
    // =========================================================================

    /// One hourly report row.
    pub fn report_row(hour: u32, supply_tag_id: u64) -> Value {
        json!({
            "date": format!("2016-01-01 {hour:02}:00:00"),
            "supply_tag_id": supply_tag_id,
            "total_impressions": 1000 + u64::from(hour) * 10,
            "total_revenue": f64::from(hour) * 0.5,
        })
    }

    /// `count` hourly rows for supply tag 1.
    pub fn report_rows(count: u32) -> Vec<Value> {
        (0..count).map(|hour| Self::report_row(hour % 24, 1)).collect()
    }

    // =========================================================================
    // Scenario Builders
    // =========================================================================

    /// Create a default set of test data for common scenarios.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

/// A complete test scenario.
pub struct DefaultScenario {
    pub resources: Vec<(&'static str, Vec<Value>)>,
    pub report_rows: Vec<Value>,
}

impl DefaultScenario {
    fn new() -> Self {
        // 25 supply tags span three pages at the default page size.
        let resources = vec![
            (SUPPLY_TAGS, Fixtures::supply_tags(25)),
            (
                DEMAND_TAGS,
                vec![
                    Fixtures::demand_tag(1, "Premium Video", 12.0),
                    Fixtures::demand_tag(2, "Remnant", 2.5),
                    Fixtures::demand_tag(3, "Backfill", 0.75),
                ],
            ),
            (
                DOMAIN_LISTS,
                vec![
                    Fixtures::domain_list(1, "Allow List", &["example.com", "example.org"]),
                    Fixtures::domain_list(2, "Block List", &["spam.example"]),
                ],
            ),
        ];

        Self {
            resources,
            report_rows: Fixtures::report_rows(12),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_tags_are_numbered() {
        let tags = Fixtures::supply_tags(3);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0]["id"], 1);
        assert_eq!(tags[2]["name"], "Supply Tag 3");
    }

    #[test]
    fn test_report_row() {
        let row = Fixtures::report_row(5, 9);
        assert_eq!(row["date"], "2016-01-01 05:00:00");
        assert_eq!(row["supply_tag_id"], 9);
        assert_eq!(row["total_impressions"], 1050);
    }

    #[test]
    fn test_default_scenario() {
        let scenario = Fixtures::default_scenario();
        assert_eq!(scenario.resources.len(), 3);
        assert_eq!(scenario.resources[0].1.len(), 25);
        assert_eq!(scenario.report_rows.len(), 12);
    }
}
