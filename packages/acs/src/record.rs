//! Per-block-group raw field values with defaulting ingestion.

use std::collections::BTreeMap;

/// Raw tabulated field values for one block group.
///
/// Fields are keyed by the friendly names in [`crate::variables`].
/// Lookups for fields that were never ingested return 0 — downstream
/// aggregation never has to distinguish "absent" from "zero".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRecord {
    fields: BTreeMap<String, f64>,
}

impl FieldRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a field value.
    pub fn insert(&mut self, field: &str, value: f64) {
        self.fields.insert(field.to_string(), value);
    }

    /// Returns the field value, or 0 if the field is missing.
    #[must_use]
    pub fn get(&self, field: &str) -> f64 {
        self.fields.get(field).copied().unwrap_or(0.0)
    }

    /// Sums several fields, treating missing ones as 0.
    #[must_use]
    pub fn sum(&self, fields: &[&str]) -> f64 {
        fields.iter().map(|f| self.get(f)).sum()
    }

    /// Returns `true` if no field was ever ingested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parses a raw table cell into a nonnegative count.
///
/// The Census Data API returns cells as strings or numbers, uses empty
/// strings and `null` for missing data, and encodes suppressed cells as
/// large negative sentinels (e.g. -666666666). All of those coerce to 0;
/// a single bad cell never fails the batch.
#[must_use]
pub fn parse_count(value: &serde_json::Value) -> f64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_default_to_zero() {
        let record = FieldRecord::new();
        assert!(record.get("total_population").abs() < f64::EPSILON);
        assert!(record.is_empty());
    }

    #[test]
    fn sum_skips_missing_fields() {
        let mut record = FieldRecord::new();
        record.insert("male_0_4", 12.0);
        record.insert("female_0_4", 8.0);
        let total = record.sum(&["male_0_4", "female_0_4", "not_a_field"]);
        assert!((total - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_numeric_and_string_cells() {
        assert!((parse_count(&json!(1250)) - 1250.0).abs() < f64::EPSILON);
        assert!((parse_count(&json!("1250")) - 1250.0).abs() < f64::EPSILON);
        assert!((parse_count(&json!(" 42 ")) - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn coerces_bad_cells_to_zero() {
        assert!(parse_count(&json!(null)).abs() < f64::EPSILON);
        assert!(parse_count(&json!("")).abs() < f64::EPSILON);
        assert!(parse_count(&json!("N/A")).abs() < f64::EPSILON);
        assert!(parse_count(&json!(true)).abs() < f64::EPSILON);
    }

    #[test]
    fn coerces_negative_sentinels_to_zero() {
        assert!(parse_count(&json!(-666_666_666)).abs() < f64::EPSILON);
        assert!(parse_count(&json!("-1")).abs() < f64::EPSILON);
    }
}
