//! Field normalizer: pure cell-level cleaning and coercion.

use html_escape::decode_html_entities;
use itertools::Itertools;

use crate::{
    data::{Value, parse_bool_token, parse_finite_f64},
    error::MalformedValue,
};

/// Decodes HTML entities, collapses whitespace runs to a single space, and
/// trims. A missing value stays missing.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    let value = value?;
    let decoded = decode_html_entities(value);
    Some(decoded.split_whitespace().join(" "))
}

pub fn trim_text(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Forgiving numeric coercion. Numbers pass through, numeric text is parsed,
/// booleans become 1/0, anything else is [`MalformedValue`].
pub fn coerce_numeric(value: Option<Value>) -> Result<Option<Value>, MalformedValue> {
    match value {
        None => Ok(None),
        Some(Value::Integer(i)) => Ok(Some(Value::Integer(i))),
        Some(Value::Float(f)) => Ok(Some(Value::Float(f))),
        Some(Value::Boolean(b)) => Ok(Some(Value::Integer(i64::from(b)))),
        Some(Value::String(raw)) => {
            if let Ok(i) = raw.trim().parse::<i64>() {
                return Ok(Some(Value::Integer(i)));
            }
            parse_finite_f64(&raw)
                .map(|f| Some(Value::Float(f)))
                .ok_or(MalformedValue { raw })
        }
    }
}

/// Numeric reading of a cell before coercion has run: text that parses counts.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::String(raw) => parse_finite_f64(raw),
        other => other.as_f64(),
    }
}

/// Truthiness of a flag cell: boolean tokens by meaning, numbers by being
/// non-zero, and any other non-empty text as true.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => parse_bool_token(s).unwrap_or(!s.is_empty()),
    }
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// `entire_home` becomes `Entire Home`.
pub fn room_type_clean(raw: &str) -> String {
    title_case(&raw.replace('_', " "))
}

/// Ratio that never divides by zero: a missing numerator or a missing,
/// zero, or negative denominator yields 0, as does a negative or non-finite
/// result.
pub fn guarded_ratio(numerator: Option<f64>, denominator: Option<f64>) -> f64 {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => {
            let ratio = n / d;
            if ratio.is_finite() && ratio >= 0.0 {
                ratio
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// Fraction of booked nights as a percentage; missing reads as 0.
pub fn occupancy_percentage(fraction: Option<f64>) -> f64 {
    fraction.map(|f| f * 100.0).unwrap_or(0.0)
}
