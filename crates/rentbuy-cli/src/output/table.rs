use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, matrix_rows, object_rows};

/// Format output as tables using the tabled crate.
///
/// Scalar fields go into a Field/Value table; nested row arrays (cash-flow
/// tables, sensitivity points) and sensitivity matrices get their own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_object(result);
                print_envelope_notes(map);
            }
            _ => print_object(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();

    for (key, val) in map {
        match val {
            Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_) | Value::Array(_))) => {
                nested.push((key, arr))
            }
            Value::Object(inner) => {
                for (inner_key, inner_val) in inner {
                    builder.push_record([format!("{key}.{inner_key}"), cell(inner_val)]);
                }
            }
            _ => builder.push_record([key.clone(), cell(val)]),
        }
    }
    println!("{}", Table::from(builder));

    if let Some(rows) = matrix_rows(map) {
        println!();
        print_grid(rows);
        return;
    }
    for (key, arr) in nested {
        println!("\n{key}:");
        print_rows(arr);
    }
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }
    match object_rows(arr) {
        Some((headers, rows)) => {
            let mut builder = Builder::default();
            builder.push_record(headers);
            for row in rows {
                builder.push_record(row);
            }
            println!("{}", Table::from(builder));
        }
        None => {
            for item in arr {
                println!("{}", cell(item));
            }
        }
    }
}

fn print_grid(rows: Vec<Vec<String>>) {
    let mut builder = Builder::default();
    for row in rows {
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
