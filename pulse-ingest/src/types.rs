use serde::{Deserialize, Serialize};

/// One data line of an export, keyed by the header line's column names.
///
/// Fields keep header order. Lookups go by exact header text; when a header
/// repeats, the last column with that name wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CsvRow {
    fields: Vec<(String, String)>,
}

impl CsvRow {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Value of `column`, if the header had it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Value of `column`, or "" when the column is absent.
    pub fn field(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> CsvRow {
        CsvRow::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_lookup_by_exact_header() {
        let r = row(&[("Date", "2025-09-01"), ("Payment status", "Succeeded")]);
        assert_eq!(r.get("Payment status"), Some("Succeeded"));
        assert_eq!(r.get("payment status"), None);
        assert_eq!(r.field("Refunded"), "");
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let r = row(&[("Item", "first"), ("Item", "second")]);
        assert_eq!(r.get("Item"), Some("second"));
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn test_keys_keep_header_order() {
        let r = row(&[("b", "1"), ("a", "2"), ("c", "3")]);
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(r.values().collect::<Vec<_>>(), vec!["1", "2", "3"]);
    }
}
