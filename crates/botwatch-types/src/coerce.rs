//! Lenient conversions from loosely typed JSON input.
//!
//! Bot integrations are not consistent about types: the same field may arrive
//! as `42`, `42.0` or `"42"`. These helpers accept any of those forms and
//! reject everything else.

use serde_json::Value;

/// Interprets `value` as a strictly positive integer identifier.
///
/// Accepts JSON integers, floats without a fractional part, and strings that
/// parse as either. Booleans, null, arrays and objects are rejected.
pub fn positive_id(value: &Value) -> Option<i64> {
    let id = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(i),
            None => n.as_f64().and_then(whole_number),
        },
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole_number))
        }
        _ => None,
    }?;

    (id > 0).then_some(id)
}

fn whole_number(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which does not fit.
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Converts an optional field to text, mapping absent and falsy values
/// (`null`, `false`, `0`, `""`) to `None`.
pub fn optional_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("true".to_string()),
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                None
            } else if n.is_f64() {
                // 1.0 reads as "1", the way the dashboard's JS renders it
                let f = n.as_f64()?;
                Some(whole_number(f).map_or_else(|| n.to_string(), |i| i.to_string()))
            } else {
                Some(n.to_string())
            }
        }
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Like [`optional_text`], but trims the result and treats blank text as absent.
pub fn trimmed_text(value: &Value) -> Option<String> {
    optional_text(value)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
