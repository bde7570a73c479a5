use serde_json::{Map, Value};
use std::io;

use super::{cell, matrix_rows, object_rows};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Row arrays become one record per row; a sensitivity matrix becomes a grid;
/// anything else is written as field,value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => write_object(&mut wtr, result),
            _ => write_object(&mut wtr, map),
        },
        Value::Array(arr) => write_rows(&mut wtr, arr),
        _ => wtr.write_record([cell(value)]),
    };

    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        log::error!("CSV write failed: {e}");
    }
}

fn write_object(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) -> csv::Result<()> {
    if let Some(rows) = matrix_rows(map) {
        for row in rows {
            wtr.write_record(&row)?;
        }
        return Ok(());
    }

    // The first nested row table is the payload (points, schedule, rows)
    let rows = map.values().find_map(|v| match v {
        Value::Array(arr) if matches!(arr.first(), Some(Value::Object(_))) => Some(arr),
        _ => None,
    });
    if let Some(arr) = rows {
        return write_rows(wtr, arr);
    }

    wtr.write_record(["field", "value"])?;
    for (key, val) in map {
        wtr.write_record([key.as_str(), &cell(val)])?;
    }
    Ok(())
}

fn write_rows(wtr: &mut StdoutWriter<'_>, arr: &[Value]) -> csv::Result<()> {
    match object_rows(arr) {
        Some((headers, rows)) => {
            wtr.write_record(&headers)?;
            for row in rows {
                wtr.write_record(&row)?;
            }
        }
        None => {
            for item in arr {
                wtr.write_record([cell(item)])?;
            }
        }
    }
    Ok(())
}
