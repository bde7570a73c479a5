pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value for a cell. Decimals arrive as strings.
pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Rows of an array whose elements are all objects, keyed by the first
/// element's fields.
pub(crate) fn object_rows(arr: &[Value]) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let Some(Value::Object(first)) = arr.first() else {
        return None;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut rows = Vec::with_capacity(arr.len());
    for item in arr {
        let Value::Object(map) = item else {
            return None;
        };
        rows.push(
            headers
                .iter()
                .map(|h| map.get(h.as_str()).map(cell).unwrap_or_default())
                .collect(),
        );
    }
    Some((headers, rows))
}

/// A two-way sensitivity grid: header row of variable_2 values, one row per
/// variable_1 value.
pub(crate) fn matrix_rows(result: &serde_json::Map<String, Value>) -> Option<Vec<Vec<String>>> {
    let Some(Value::Array(matrix)) = result.get("matrix") else {
        return None;
    };
    let axis = |key: &str| -> Vec<String> {
        match result.get(key) {
            Some(Value::Array(values)) => values.iter().map(cell).collect(),
            _ => Vec::new(),
        }
    };
    let v1 = axis("variable_1_values");
    let v2 = axis("variable_2_values");

    let corner = format!(
        "{} \\ {}",
        result.get("variable_1_name").map(cell).unwrap_or_default(),
        result.get("variable_2_name").map(cell).unwrap_or_default()
    );
    let mut rows = vec![std::iter::once(corner).chain(v2).collect::<Vec<_>>()];
    for (i, row) in matrix.iter().enumerate() {
        let Value::Array(cells) = row else {
            return None;
        };
        let label = v1.get(i).cloned().unwrap_or_default();
        rows.push(std::iter::once(label).chain(cells.iter().map(cell)).collect());
    }
    Some(rows)
}
