use serde_json::Value;

use super::cell;

/// Headline fields, most decisive first.
const PRIORITY_KEYS: [&str; 7] = [
    "recommendation",
    "net_worth_difference",
    "monthly_payment",
    "valid",
    "breakeven_month",
    "npv_difference",
    "total_interest",
];

/// Closing figure of a month-by-month table, checked on its last row.
const ROW_KEYS: [&str; 4] = ["balance", "portfolio_balance", "home_equity", "cumulative_net_cost"];

/// Print just the key answer from the output: the first non-null priority
/// field of the result, else the first field. Tables print their last row's
/// closing figure.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    println!("{}", headline(result_obj));
}

fn headline(result: &Value) -> String {
    let map = match result {
        Value::Object(map) => map,
        Value::Array(rows) => return last_row_headline(rows),
        other => return cell(other),
    };

    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
            return cell(val);
        }
    }
    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, headline(val)),
        None => String::new(),
    }
}

fn last_row_headline(rows: &[Value]) -> String {
    let Some(last) = rows.last() else {
        return String::new();
    };
    if let Value::Object(row) = last {
        for key in ROW_KEYS {
            if let Some(val) = row.get(key).filter(|v| !v.is_null()) {
                return cell(val);
            }
        }
    }
    headline(last)
}
