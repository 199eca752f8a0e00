//! Coercion of dynamically typed attribute values into the scalar domain of a
//! field's declared [`ValueType`].

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use tvs_fields::ValueType;

/// A value coerced to a field's declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// String or choice value.
    Text(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
}

impl Scalar {
    /// Orders two scalars of the same ordered type; `None` across types.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a.partial_cmp(b),
            (Scalar::Date(a), Scalar::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

/// Reason a value could not be coerced, reported inside `TypeMismatch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFailure {
    /// Declared type the value was coerced to.
    pub expected: ValueType,
    /// Compact rendering of the offending value.
    pub found: String,
}

/// Coerces one JSON value to a scalar of `value_type`.
///
/// `Ok(None)` means the value is `null`, which callers treat as missing.
pub fn coerce_scalar(
    value: &Value,
    value_type: ValueType,
) -> Result<Option<Scalar>, CoercionFailure> {
    if value.is_null() {
        return Ok(None);
    }
    let scalar = match value_type {
        ValueType::String | ValueType::Choice => as_text(value).map(Scalar::Text),
        ValueType::Number | ValueType::Range => as_number(value).map(Scalar::Number),
        ValueType::Bool => as_bool(value).map(Scalar::Bool),
        ValueType::Date => as_date(value).map(Scalar::Date),
    };
    scalar.map(Some).ok_or_else(|| CoercionFailure {
        expected: value_type,
        found: render(value),
    })
}

/// Coerces a stored record value, allowing lists for multi-select choices.
///
/// Returns an empty vector for `null`; nulls inside a list are skipped.
pub fn coerce_stored(value: &Value, value_type: ValueType) -> Result<Vec<Scalar>, CoercionFailure> {
    match (value, value_type) {
        (Value::Array(items), ValueType::Choice) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                if let Some(scalar) = coerce_scalar(item, value_type)? {
                    out.push(scalar);
                }
            }
            Ok(out)
        }
        _ => Ok(coerce_scalar(value, value_type)?.into_iter().collect()),
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|stamp| stamp.date_naive())
        })
}

fn render(value: &Value) -> String {
    let mut rendered = value.to_string();
    if rendered.len() > 64 {
        let mut cut = 64;
        while !rendered.is_char_boundary(cut) {
            cut -= 1;
        }
        rendered.truncate(cut);
        rendered.push_str("...");
    }
    rendered
}
