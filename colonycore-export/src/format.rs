// colonycore-export/src/format.rs
// ============================================================================
// Module: Export Formats
// Description: The output formats a dataset template can support, and the
// renderers that turn resolved rows into bytes.
// Purpose: Keep rendering logic independent of the worker loop and the
// blob store it writes to.
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One output encoding a dataset template can be rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// A JSON array of row objects.
    Json,
    /// Comma-separated values, header row first.
    Csv,
}

impl ExportFormat {
    /// Parses a format from its wire name (`"json"`, `"csv"`), case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    /// The file extension used in blob store keys (`export/<id>/<slug>.<ext>`).
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// The MIME type recorded alongside the artifact in the blob store.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }

    /// Renders resolved dataset rows to bytes in this format.
    #[must_use]
    pub fn render(self, rows: &[Value]) -> Vec<u8> {
        match self {
            Self::Json => render_json(rows),
            Self::Csv => render_csv(rows),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Renders rows as a JSON array. Falls back to an empty array on an
/// unexpected serialization failure rather than panicking the worker.
fn render_json(rows: &[Value]) -> Vec<u8> {
    serde_json::to_vec_pretty(rows).unwrap_or_else(|_| b"[]".to_vec())
}

/// Renders rows as CSV. Columns are the union of every row's top-level
/// object keys, in sorted order, so the header is stable across rows that
/// don't all share the same keys. Non-object rows and nested values are
/// rendered as their JSON text.
fn render_csv(rows: &[Value]) -> Vec<u8> {
    let mut columns = std::collections::BTreeSet::new();
    for row in rows {
        if let Value::Object(map) = row {
            columns.extend(map.keys().cloned());
        }
    }
    let columns: Vec<String> = columns.into_iter().collect();

    let mut out = String::new();
    out.push_str(&columns.iter().map(|c| csv_escape(c)).collect::<Vec<_>>().join(","));
    out.push('\n');
    for row in rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| {
                let cell = row.get(column).map_or(String::new(), value_to_cell);
                csv_escape(&cell)
            })
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out.into_bytes()
}

/// Renders a single JSON value as a flat CSV cell: strings unwrap their
/// quotes, everything else uses its JSON text.
fn value_to_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Quotes a CSV field if it contains a comma, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
