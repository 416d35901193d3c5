//! Validated extraction of primitive values from untyped JSON fields.

use serde_json::Value;

use crate::error::ApiError;

/// Read an integer out of `value`, enforcing `minimum` and an optional `maximum`.
///
/// Accepts JSON integers, floats (truncated toward zero) and strings holding a
/// base-10 integer. Booleans are rejected even though they look like 0/1.
pub fn coerce_int(
    value: &Value,
    field: &str,
    minimum: i64,
    maximum: Option<i64>,
) -> Result<i64, ApiError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_int_str(s.trim()),
        Value::Bool(_) | Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    let n = parsed.ok_or_else(|| ApiError::bad_request(format!("{field} must be an integer")))?;

    if n < minimum {
        return Err(ApiError::bad_request(format!(
            "{field} must be >= {minimum}"
        )));
    }
    if let Some(max) = maximum {
        if n > max {
            return Err(ApiError::bad_request(format!("{field} must be <= {max}")));
        }
    }
    Ok(n)
}

/// Base-10 integer with an optional sign. Digit strings too long for `i64`
/// saturate so the range check reports them.
fn parse_int_str(s: &str) -> Option<i64> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

/// Truthiness of an arbitrary JSON value.
///
/// `null`, `false`, zero, `""`, `[]` and `{}` are false; everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
