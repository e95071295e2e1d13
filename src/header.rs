use std::collections::HashMap;

/// Column name to position lookup, built once per batch from the header row.
///
/// Lookups never fail: a column missing from the header, or a row too short to
/// reach it, reads as the empty string.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn build(headers: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers.
            positions.entry(header.trim().to_string()).or_insert(idx);
        }
        Self { positions }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    pub fn value<'a>(&self, row: &'a [String], column: &str) -> &'a str {
        self.position(column)
            .and_then(|idx| row.get(idx))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn value_reads_cell_by_column_name() {
        let index = HeaderIndex::build(&strings(&["a", " b ", "c"]));
        let row = strings(&["1", "2", "3"]);
        assert_eq!(index.value(&row, "b"), "2");
        assert_eq!(index.value(&row, "c"), "3");
    }

    #[test]
    fn missing_column_and_short_row_read_as_empty() {
        let index = HeaderIndex::build(&strings(&["a", "b"]));
        assert_eq!(index.value(&strings(&["1", "2"]), "zzz"), "");
        assert_eq!(index.value(&strings(&["1"]), "b"), "");
    }

    #[test]
    fn duplicate_headers_keep_first_position() {
        let index = HeaderIndex::build(&strings(&["a", "a"]));
        assert_eq!(index.position("a"), Some(0));
        assert_eq!(index.value(&strings(&["first", "second"]), "a"), "first");
    }
}
