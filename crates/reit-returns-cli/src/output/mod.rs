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

/// Render a serialized `Metric` (`{"value": x}` / `{"unavailable": reason}`)
/// as display text. Returns None for anything else.
pub fn metric_text(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    if let Some(v) = map.get("value") {
        return Some(scalar_text(v));
    }
    map.get("unavailable")
        .and_then(Value::as_str)
        .map(|reason| format!("n/a ({})", reason.replace('_', " ")))
}

/// Plain text for scalars; nested values fall back to compact JSON.
pub fn scalar_text(value: &Value) -> String {
    if let Some(text) = metric_text(value) {
        return text;
    }
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_text() {
        assert_eq!(metric_text(&json!({"value": "24.0"})), Some("24.0".into()));
        assert_eq!(
            metric_text(&json!({"unavailable": "zero_elapsed_time"})),
            Some("n/a (zero elapsed time)".into())
        );
        assert_eq!(metric_text(&json!({"value": 1, "other": 2})), None);
        assert_eq!(metric_text(&json!("plain")), None);
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!("10.6")), "10.6");
        assert_eq!(scalar_text(&Value::Null), "");
        assert_eq!(scalar_text(&json!({"value": "0.5"})), "0.5");
    }
}
