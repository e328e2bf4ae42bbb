use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{metric_text, scalar_text};

const MONTH_HEADERS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_section(result);
                print_envelope_notes(map);
            } else {
                print_section(value);
            }
        }
        _ => print_section(value),
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_section(value: &Value) {
    match value {
        Value::Object(map) if is_payment_grid(map) => print_payment_grid(map),
        Value::Object(map) => print_object(map),
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", scalar_text(value)),
    }
}

/// Scalar and metric fields go into one Field/Value table; nested
/// records and lists get their own titled sections below it.
fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut nested = Vec::new();
    let mut flat_fields = 0;

    for (key, val) in map {
        if is_flat(val) {
            builder.push_record([key.as_str(), &scalar_text(val)]);
            flat_fields += 1;
        } else {
            nested.push((key, val));
        }
    }

    if flat_fields > 0 {
        println!("{}", Table::from(builder));
    }
    for (key, val) in nested {
        println!("\n{}:", key);
        print_section(val);
    }
}

fn is_flat(value: &Value) -> bool {
    match value {
        Value::Array(_) => false,
        Value::Object(_) => metric_text(value).is_some(),
        _ => true,
    }
}

fn is_payment_grid(map: &Map<String, Value>) -> bool {
    matches!(map.get("years"), Some(Value::Array(_))) && map.contains_key("paid_count")
}

/// Year x month grid: the paid amount, `missed`, or `-` for not applicable.
fn print_payment_grid(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    let mut header = vec!["Year".to_string()];
    header.extend(MONTH_HEADERS.iter().map(|m| m.to_string()));
    builder.push_record(header);

    if let Some(Value::Array(years)) = map.get("years") {
        for year in years {
            let mut row = vec![year.get("year").map(scalar_text).unwrap_or_default()];
            let cells = year
                .get("cells")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            row.extend(cells.iter().map(grid_cell_text));
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));

    let paid = map.get("paid_count").map(scalar_text).unwrap_or_default();
    let total = map.get("total_count").map(scalar_text).unwrap_or_default();
    let rate = map
        .get("success_rate_percent")
        .map(scalar_text)
        .unwrap_or_default();
    println!("\nPaid {} of {} applicable months, success rate {}", paid, total, rate);
}

fn grid_cell_text(cell: &Value) -> String {
    match cell.get("status").and_then(Value::as_str) {
        Some("paid") => cell.get("amount").map(scalar_text).unwrap_or_else(|| "paid".into()),
        Some("missed") => "missed".into(),
        _ => "-".into(),
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(scalar_text).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", scalar_text(item));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_grid_cell_text() {
        assert_eq!(grid_cell_text(&json!({"month": 1, "status": "paid", "amount": "0.10"})), "0.10");
        assert_eq!(grid_cell_text(&json!({"month": 2, "status": "missed"})), "missed");
        assert_eq!(grid_cell_text(&json!({"month": 3, "status": "not_applicable"})), "-");
    }

    #[test]
    fn test_metrics_are_flat_but_records_are_not() {
        assert!(is_flat(&json!({"unavailable": "no_valuation_data"})));
        assert!(is_flat(&json!("2024-12-31")));
        assert!(!is_flat(&json!({"value": "10", "source": "reported"})));
        assert!(!is_flat(&json!([1, 2])));
    }
}
