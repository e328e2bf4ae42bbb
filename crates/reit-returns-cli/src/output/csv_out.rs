use serde_json::{Map, Value};
use std::io;

use super::scalar_text;

/// Write output as CSV to stdout.
///
/// Row-shaped results (series, curve points, comparisons) become one row per
/// record; the payment grid becomes one row per month; anything else is a
/// two-column field/value listing.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Array(years)) = map.get("years") {
                write_grid_csv(&mut wtr, years);
            } else if let Some(Value::Array(points)) = map.get("points") {
                write_array_csv(&mut wtr, points);
            } else {
                write_fields_csv(&mut wtr, map);
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&scalar_text(result)]);
        }
    }

    let _ = wtr.flush();
}

fn write_fields_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &scalar_text(val)]);
    }
}

fn write_grid_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, years: &[Value]) {
    let _ = wtr.write_record(["year", "month", "status", "amount"]);
    for year in years {
        let y = year.get("year").map(scalar_text).unwrap_or_default();
        let cells = year
            .get("cells")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for cell in cells {
            let _ = wtr.write_record([
                y.clone(),
                cell.get("month").map(scalar_text).unwrap_or_default(),
                cell.get("status").map(scalar_text).unwrap_or_default(),
                cell.get("amount").map(scalar_text).unwrap_or_default(),
            ]);
        }
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(scalar_text).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&scalar_text(item)]);
        }
    }
}
