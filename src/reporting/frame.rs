//! Tabular view over report rows.

use serde::Serialize;
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::Table;

const NULL: &Value = &Value::Null;

/// Report rows with a stable column order.
///
/// Columns appear in the order they are first seen across rows. Rows that
/// are not JSON objects are stored under a single `value` column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportFrame {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl ReportFrame {
    /// Build a frame from row values.
    pub fn from_rows<I: IntoIterator<Item = Value>>(rows: I) -> Self {
        let mut frame = Self::default();
        for row in rows {
            frame.push_row(row);
        }
        frame
    }

    /// Build a frame from a report's `data` field.
    pub fn from_data(data: Option<&Value>) -> Self {
        match data {
            Some(Value::Array(rows)) => Self::from_rows(rows.iter().cloned()),
            _ => Self::default(),
        }
    }

    /// Add one row, extending the columns with any new keys.
    pub fn push_row(&mut self, row: Value) {
        let row = match row {
            Value::Object(fields) => fields,
            other => {
                let mut fields = Map::new();
                fields.insert("value".to_string(), other);
                fields
            }
        };
        for key in row.keys() {
            if !self.columns.iter().any(|c| c == key) {
                self.columns.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Append every row of `other`.
    pub fn append(&mut self, other: ReportFrame) {
        for row in other.rows {
            self.push_row(Value::Object(row));
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Values of one column, `null` where a row lacks it.
    pub fn column(&self, name: &str) -> Vec<&Value> {
        self.rows.iter().map(|row| row.get(name).unwrap_or(NULL)).collect()
    }

    /// Render as a text table with a header row.
    pub fn to_table(&self) -> Table {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().cloned());
        for row in &self.rows {
            builder.push_record(
                self.columns
                    .iter()
                    .map(|column| cell(row.get(column).unwrap_or(NULL))),
            );
        }
        builder.build()
    }
}

/// Display text for one cell: strings unquoted, `null` blank.
pub fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_columns_in_first_seen_order() {
        let frame = ReportFrame::from_rows(vec![
            json!({"date": "2016-01-01", "impressions": 10}),
            json!({"date": "2016-01-02", "revenue": 1.5}),
        ]);
        assert_eq!(frame.len(), 2);
        assert!(frame.columns().contains(&"revenue".to_string()));
        assert_eq!(frame.columns().len(), 3);
        assert_eq!(frame.column("revenue"), vec![&Value::Null, &json!(1.5)]);
    }

    #[test]
    fn test_from_data_ignores_non_arrays() {
        assert!(ReportFrame::from_data(None).is_empty());
        assert!(ReportFrame::from_data(Some(&json!({"a": 1}))).is_empty());
        assert_eq!(ReportFrame::from_data(Some(&json!([{"a": 1}]))).len(), 1);
    }

    #[test]
    fn test_append() {
        let mut frame = ReportFrame::from_rows(vec![json!({"a": 1})]);
        frame.append(ReportFrame::from_rows(vec![json!({"a": 2}), json!({"b": 3})]));
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.columns(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_scalar_rows_use_value_column() {
        let frame = ReportFrame::from_rows(vec![json!(1), json!("x")]);
        assert_eq!(frame.columns(), &["value".to_string()]);
        assert_eq!(frame.column("value"), vec![&json!(1), &json!("x")]);
    }

    #[test]
    fn test_table_renders_cells() {
        let frame = ReportFrame::from_rows(vec![json!({"domain": "example.com", "total": null})]);
        let rendered = frame.to_table().to_string();
        assert!(rendered.contains("domain"));
        assert!(rendered.contains("example.com"));
        assert!(!rendered.contains("\"example.com\""));
        assert!(!rendered.contains("null"));
    }
}
