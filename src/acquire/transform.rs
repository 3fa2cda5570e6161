//! Minimal JSON to CSV transformer.
//!
//! Input is an array of flat objects. Field order is the key order of the
//! first object; keys that only appear in later objects are ignored and
//! missing keys become empty cells. Numeric values are written bare,
//! everything else is quoted.

use crate::numeric;
use serde_json::Value;

/// Convert a JSON array of objects to CSV text. Returns `None` when the
/// input is not an array of objects or has no fields.
pub fn json_to_csv(json: &str) -> Option<String> {
    let value: Value = serde_json::from_str(json.trim()).ok()?;
    let records = value.as_array()?;
    let first = records.first()?.as_object()?;

    let fields: Vec<&String> = first.keys().collect();
    if fields.is_empty() {
        return None;
    }

    let mut out = String::new();
    out.push_str(&fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(","));
    out.push('\n');

    for record in records {
        let Some(object) = record.as_object() else {
            continue;
        };
        let line: Vec<String> = fields.iter().map(|f| cell(object.get(f.as_str()))).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    Some(out)
}

fn cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    };

    if numeric::classify(&text).is_numeric() { text } else { quote(&text) }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}
