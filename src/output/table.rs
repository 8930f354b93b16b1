use std::borrow::Cow;
use std::collections::HashSet;

use comfy_table::{Table, presets::NOTHING};

use super::ResultSet;

/// Maximum width for free-form columns
const MAX_WIDE_COLUMN_WIDTH: usize = 60;

/// Columns that should have width limits in table mode
const WIDE_COLUMNS: &[&str] = &["LABELS"];

/// Truncate a string to max_len chars, adding "..." if truncated
fn truncate_value(s: &str, max_len: usize) -> Cow<'_, str> {
    if s.chars().count() <= max_len {
        Cow::Borrowed(s)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        Cow::Owned(format!("{}...", truncated))
    }
}

pub struct TableFormatter;

impl TableFormatter {
    pub fn format(result: &ResultSet, no_headers: bool) -> String {
        if result.rows.is_empty() {
            return "(0 rows)".to_string();
        }

        let mut table = Table::new();
        // kubectl-style: no borders, space separated
        table.load_preset(NOTHING);

        let truncate_cols: HashSet<usize> = result
            .columns
            .iter()
            .enumerate()
            .filter(|(_, col)| WIDE_COLUMNS.contains(&col.as_str()))
            .map(|(idx, _)| idx)
            .collect();

        if !no_headers {
            table.set_header(&result.columns);
        }

        for row in &result.rows {
            let cells: Vec<Cow<'_, str>> = row
                .iter()
                .enumerate()
                .map(|(idx, val)| {
                    if truncate_cols.contains(&idx) {
                        truncate_value(val, MAX_WIDE_COLUMN_WIDTH)
                    } else {
                        Cow::Borrowed(val.as_str())
                    }
                })
                .collect();
            table.add_row(cells);
        }

        format!("{}\n({} rows)", table, result.rows.len())
    }
}
