//! Filterable, sortable, exportable table of records

use catalyst_util::format_label;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

use crate::ColumnMapping;

/// First line of an export; tells spreadsheet tools which separator to use
pub const EXPORT_SEPARATOR_HINT: &str = "sep=\t";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Table state: column visibility plus the rows being shown
#[derive(Debug, Clone)]
pub struct ViewTable {
    columns: Vec<ColumnMapping>,
    visible_keys: Vec<String>,
    rows: Vec<Value>,
}

impl ViewTable {
    pub fn new(columns: Vec<ColumnMapping>, rows: Vec<Value>) -> Self {
        let visible_keys = columns
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.key.clone())
            .collect();

        Self {
            columns,
            visible_keys,
            rows,
        }
    }

    /// Build a table from typed records, using their JSON field names
    pub fn from_records<T: Serialize>(
        columns: Vec<ColumnMapping>,
        records: &[T],
    ) -> serde_json::Result<Self> {
        let rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(Self::new(columns, rows))
    }

    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    pub fn rows(&self) -> &[Value] {
        &self.rows
    }

    pub fn set_rows(&mut self, rows: Vec<Value>) {
        self.rows = rows;
    }

    /// Keys of the shown columns, in the order they were made visible
    pub fn displayed_keys(&self) -> &[String] {
        &self.visible_keys
    }

    /// Shown columns, in the order they were made visible
    pub fn displayed_columns(&self) -> Vec<&ColumnMapping> {
        self.visible_keys
            .iter()
            .filter_map(|key| self.columns.iter().find(|c| &c.key == key))
            .collect()
    }

    /// Shown columns, in mapping order
    pub fn visible_columns(&self) -> Vec<&ColumnMapping> {
        self.columns
            .iter()
            .filter(|c| self.visible_keys.contains(&c.key))
            .collect()
    }

    pub fn all_columns_selected(&self) -> bool {
        self.columns.iter().all(|c| c.visible)
    }

    /// Flip one column. Returns `false` if no column has that key.
    pub fn toggle_column(&mut self, key: &str) -> bool {
        let Some(column) = self.columns.iter_mut().find(|c| c.key == key) else {
            return false;
        };

        column.visible = !column.visible;
        if column.visible {
            if !self.visible_keys.iter().any(|k| k == key) {
                self.visible_keys.push(key.to_string());
            }
        } else {
            self.visible_keys.retain(|k| k != key);
        }
        true
    }

    /// Show every column, or hide every column if all are already shown
    pub fn toggle_all_columns(&mut self) {
        let select = !self.all_columns_selected();

        if select {
            for column in &self.columns {
                if !self.visible_keys.contains(&column.key) {
                    self.visible_keys.push(column.key.clone());
                }
            }
        } else {
            self.visible_keys.clear();
        }

        for column in &mut self.columns {
            column.visible = select;
        }
    }

    /// Stable sort on a column key. One level of nesting is supported
    /// (`assignee.username`); missing values sort as empty strings.
    pub fn sort_by(&mut self, key: &str, direction: SortDirection) {
        self.rows.sort_by(|a, b| {
            let ordering = compare_sort_values(&sort_value(a, key), &sort_value(b, key));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }

    /// Rows on page `index` (zero-based) of `size` rows each
    pub fn page(&self, index: usize, size: usize) -> &[Value] {
        if size == 0 {
            return &[];
        }
        let start = index.saturating_mul(size).min(self.rows.len());
        let end = start.saturating_add(size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn page_count(&self, size: usize) -> usize {
        if size == 0 {
            0
        } else {
            self.rows.len().div_ceil(size)
        }
    }

    /// Tab-separated text of the shown columns in display order: a header
    /// of labels, then one line per row
    pub fn to_tsv(&self) -> String {
        tsv(&self.displayed_columns(), &self.rows)
    }

    /// Spreadsheet-ready export: the separator hint line, then the shown
    /// columns in mapping order
    pub fn export_csv(&self) -> String {
        format!(
            "{}\n{}",
            EXPORT_SEPARATOR_HINT,
            tsv(&self.visible_columns(), &self.rows)
        )
    }
}

fn tsv(columns: &[&ColumnMapping], rows: &[Value]) -> String {
    let header = columns
        .iter()
        .map(|c| c.label.as_str())
        .collect::<Vec<_>>()
        .join("\t");

    let mut lines = vec![header];
    for row in rows {
        let line = columns
            .iter()
            .map(|c| export_value(row, &c.key))
            .collect::<Vec<_>>()
            .join("\t");
        lines.push(line);
    }

    lines.join("\n")
}

/// Follow a dotted path through nested objects
pub fn nested_value<'a>(row: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(row, |value, segment| value.get(segment))
}

fn sort_value(row: &Value, key: &str) -> Value {
    let value = match key.split_once('.') {
        Some((parent, child)) => row.get(parent).and_then(|p| p.get(child)),
        None => row.get(key),
    };
    match value {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(v) => v.clone(),
    }
}

fn compare_sort_values(a: &Value, b: &Value) -> Ordering {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => display_text(a).cmp(&display_text(b)),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0 || f.is_nan()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Cell text for an export: empty for falsy values, underscores in
/// strings shown as spaces
fn export_value(row: &Value, key: &str) -> String {
    match nested_value(row, key) {
        None => String::new(),
        Some(value) if is_falsy(value) => String::new(),
        Some(Value::String(s)) => format_label(s),
        Some(other) => other.to_string(),
    }
}
