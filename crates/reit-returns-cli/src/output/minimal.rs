use serde_json::Value;

use super::scalar_text;

/// Key output fields, in order of priority.
const PRIORITY_KEYS: [&str; 8] = [
    "irr_percent",
    "irr",
    "gross_yield_percent",
    "ttm_yield_percent",
    "success_rate_percent",
    "total_dividends",
    "properties",
    "points",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object. Comparison
/// output prints one `property_id: value` line per property.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result_obj {
        Value::Array(items) => {
            for item in items {
                let id = item.get("property_id").map(scalar_text).unwrap_or_default();
                println!("{}: {}", id, key_answer(item));
            }
        }
        _ => println!("{}", key_answer(result_obj)),
    }
}

fn key_answer(value: &Value) -> String {
    let Value::Object(map) = value else {
        return scalar_text(value);
    };

    // Nested reports (analyze) answer with their summary
    if let Some(summary @ Value::Object(_)) = map.get("summary") {
        return key_answer(summary);
    }

    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key) {
            if !val.is_null() {
                return match val {
                    Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join("\n"),
                    _ => scalar_text(val),
                };
            }
        }
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, scalar_text(val)),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_answer_prefers_irr() {
        let summary = json!({
            "gross_yield_percent": {"value": "24.0"},
            "irr_percent": {"value": "9.8"}
        });
        assert_eq!(key_answer(&summary), "9.8");
    }

    #[test]
    fn test_key_answer_unavailable_metric() {
        let summary = json!({"irr_percent": {"unavailable": "no_valuation_data"}});
        assert_eq!(key_answer(&summary), "n/a (no valuation data)");
    }

    #[test]
    fn test_key_answer_descends_into_summary() {
        let analysis = json!({
            "payment_grid": {"paid_count": 3},
            "summary": {"ttm_yield_percent": {"value": "12"}}
        });
        assert_eq!(key_answer(&analysis), "12");
    }
}
